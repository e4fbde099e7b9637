use std::path::Path;
use std::sync::Arc;

use renderq_core::{JobEvent, JobOutcome, JobPhase, JobReport, ProgressSnapshot, QueueReport, StopReason};
use renderq_logging::{queue_debug, queue_error, queue_info, queue_trace, queue_warn};

use crate::{
    Attribute, ContextFactory, EngineError, Interrupt, OrchestratorSettings, ProgressSampler,
    RenderContext, RenderOptions, SceneFile, Statistic,
};

/// Drives queued scene files through the engine, one context per job.
pub struct JobOrchestrator<F> {
    factory: F,
    options: RenderOptions,
    settings: OrchestratorSettings,
    interrupt: Interrupt,
    abort_reason: Option<String>,
}

/// What cut a job short.
enum JobInterrupt {
    Stop(StopReason),
    Engine(EngineError),
}

impl From<StopReason> for JobInterrupt {
    fn from(reason: StopReason) -> Self {
        JobInterrupt::Stop(reason)
    }
}

impl From<EngineError> for JobInterrupt {
    fn from(err: EngineError) -> Self {
        JobInterrupt::Engine(err)
    }
}

impl<F: ContextFactory> JobOrchestrator<F> {
    pub fn new(
        factory: F,
        options: RenderOptions,
        settings: OrchestratorSettings,
        interrupt: Interrupt,
    ) -> Self {
        Self {
            factory,
            options,
            settings,
            interrupt,
            abort_reason: None,
        }
    }

    pub fn interrupt(&self) -> &Interrupt {
        &self.interrupt
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Renders every scene in order until the queue ends or is aborted.
    pub fn run<I, P>(&mut self, scenes: I) -> QueueReport
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut report = QueueReport::default();
        for scene in scenes {
            if self.abort_reason.is_none() {
                self.take_pending_abort();
            }
            if let Some(reason) = &self.abort_reason {
                report.abort_reason = Some(reason.clone());
                break;
            }
            report.push(self.process_scene(scene.as_ref()));
        }
        if report.abort_reason.is_none() {
            report.abort_reason = self.abort_reason.clone();
        }
        report
    }

    /// Renders one scene and tears its context down, whatever the outcome.
    pub fn process_scene(&mut self, path: &Path) -> JobReport {
        if !path.exists() {
            queue_warn!(
                "Scene file to render \"{}\" does not exist, skipping.",
                path.display()
            );
            return JobReport::new(path, JobOutcome::Missing);
        }

        if let Some(stale) = self.interrupt.discard_skip() {
            queue_debug!("Ignoring skip raised between jobs ({})", stale);
        }

        let name = path.display().to_string();
        let context = match self.factory.create(&name) {
            Ok(context) => context,
            Err(err) => {
                queue_error!("Could not create a render context for {}: {}", name, err);
                return JobReport::new(
                    path,
                    JobOutcome::Failed {
                        reason: err.to_string(),
                    },
                );
            }
        };

        let mut job = Job::new(SceneFile::new(path), context);
        let outcome = match self.run_job(&mut job) {
            Ok(()) => {
                job.advance(JobEvent::RenderComplete);
                if let Some(summary) = job.final_snapshot().and_then(|s| s.summary()) {
                    queue_info!("{}", summary);
                }
                JobOutcome::Done
            }
            Err(JobInterrupt::Stop(StopReason::Skip { reason })) => {
                queue_info!("Stopping this render... ({})", reason);
                job.advance(JobEvent::Skip);
                JobOutcome::Skipped { reason }
            }
            Err(JobInterrupt::Stop(StopReason::Abort { reason })) => {
                queue_info!("Stopping all rendering... ({})", reason);
                job.advance(JobEvent::Abort);
                self.abort_reason = Some(reason.clone());
                JobOutcome::Aborted { reason }
            }
            Err(JobInterrupt::Engine(err)) => {
                queue_error!("Rendering {} failed: {}", name, err);
                job.advance(JobEvent::Fail);
                JobOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        };

        job.teardown();
        let mut report = JobReport::new(path, outcome);
        report.last_progress = job.last_progress;
        report.progress_error = job.progress_error.take();
        report
    }

    fn run_job(&self, job: &mut Job) -> Result<(), JobInterrupt> {
        let ctx = job.context.clone();
        self.configure(ctx.as_ref())?;

        ctx.parse(&job.scene)?;
        job.advance(JobEvent::SubmitParse);

        job.advance(JobEvent::AwaitScene);
        while !ctx.flag(Statistic::SceneIsReady)? {
            self.interrupt.sleep(self.settings.ready_poll)?;
            if !ctx.parse_successful() {
                return Err(StopReason::skip("Skipping bad scene file").into());
            }
        }
        job.advance(JobEvent::SceneReady);

        let width = ctx.attribute(Attribute::FILM_X_RESOLUTION)?;
        let height = ctx.attribute(Attribute::FILM_Y_RESOLUTION)?;
        job.resolution = Some((width, height));
        queue_info!("Rendering {} ({}x{})", ctx.name(), width, height);

        // The context starts with one worker of its own.
        for _ in 1..self.options.resolved_threads() {
            ctx.add_thread()?;
        }

        let mut sampler = ProgressSampler::with_timing(
            ctx.clone(),
            self.settings.sampler_interval,
            self.settings.sampler_startup_delay,
        );
        sampler.seed_resolution(width, height);
        sampler.start().map_err(EngineError::from)?;
        let sampler = job.sampler.insert(sampler);

        while !render_finished(ctx.as_ref())? {
            self.interrupt.sleep(self.settings.render_poll)?;
            sampler.poke()?;
        }
        Ok(())
    }

    /// Applies the per-context options before any parsing starts.
    fn configure(&self, ctx: &dyn RenderContext) -> Result<(), EngineError> {
        if self.options.debug {
            ctx.enable_debug_mode()?;
        }
        if self.options.applies_fixed_seed() {
            ctx.disable_random_mode()?;
        }
        if let Some(secs) = self.options.server_interval {
            ctx.set_network_server_update_interval(secs)?;
        }
        for server in &self.options.servers {
            ctx.add_server(server)?;
        }
        Ok(())
    }

    fn take_pending_abort(&mut self) {
        if let Some(StopReason::Abort { .. }) = self.interrupt.pending() {
            if let Some(reason) = self.interrupt.take() {
                queue_info!("Stopping all rendering... ({})", reason);
                self.abort_reason = Some(reason.reason().to_string());
            }
        }
    }
}

fn render_finished(ctx: &dyn RenderContext) -> Result<bool, EngineError> {
    Ok(ctx.flag(Statistic::FilmIsReady)?
        || ctx.flag(Statistic::Terminated)?
        || ctx.flag(Statistic::EnoughSamples)?)
}

/// A scene being rendered and the context it exclusively owns.
///
/// Dropping the job tears the context down if that has not happened yet,
/// then releases it.
struct Job {
    scene: SceneFile,
    context: Arc<dyn RenderContext>,
    sampler: Option<ProgressSampler>,
    phase: JobPhase,
    resolution: Option<(f64, f64)>,
    last_progress: Option<ProgressSnapshot>,
    progress_error: Option<String>,
    torn_down: bool,
}

impl Job {
    fn new(scene: SceneFile, context: Arc<dyn RenderContext>) -> Self {
        Self {
            scene,
            context,
            sampler: None,
            phase: JobPhase::Created,
            resolution: None,
            last_progress: None,
            progress_error: None,
            torn_down: false,
        }
    }

    fn advance(&mut self, event: JobEvent) {
        match self.phase.apply(event) {
            Ok(next) => {
                queue_trace!(
                    "{}: {:?} -> {:?}",
                    self.scene.path.display(),
                    self.phase,
                    next
                );
                self.phase = next;
            }
            Err(err) => queue_warn!("{}: {}", self.scene.path.display(), err),
        }
    }

    fn final_snapshot(&self) -> Option<ProgressSnapshot> {
        let sampler = self.sampler.as_ref()?;
        match sampler.kick() {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                queue_warn!("Could not read final statistics: {}", err);
                sampler.last_snapshot()
            }
        }
    }

    /// Stops progress sampling, then exits, waits for and cleans up the
    /// context. Runs at most once.
    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        if let Some(mut sampler) = self.sampler.take() {
            self.last_progress = sampler.last_snapshot();
            if let Err(err) = sampler.finish() {
                queue_error!(
                    "Progress reporting for {} stopped early: {}",
                    self.scene.path.display(),
                    err
                );
                self.progress_error = Some(err.to_string());
            }
        }

        self.context.exit();
        self.context.wait();
        self.context.cleanup();
        self.advance(JobEvent::TearDown);
        if let Some((width, height)) = self.resolution {
            queue_debug!(
                "Released context for {} ({}x{})",
                self.scene.path.display(),
                width,
                height
            );
        }
    }
}

impl Drop for Job {
    fn drop(&mut self) {
        self.teardown();
    }
}

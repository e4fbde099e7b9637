/// Formats a duration in seconds as `H:MM:SS`.
///
/// Hours are not wrapped at a day, so long renders stay fully representable.
/// Fractional seconds are truncated; negative or non-finite input reads as zero.
pub fn format_elapsed_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
}

/// Samples contributed by attached network render servers.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NetworkProgress {
    pub servers: u32,
    pub samples: f64,
}

/// One reading of the engine's live statistics.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProgressSnapshot {
    pub elapsed_secs: f64,
    pub pixels: u64,
    pub local_samples: f64,
    /// Present only when at least one server is connected.
    pub network: Option<NetworkProgress>,
}

impl ProgressSnapshot {
    /// Both throughput denominators are non-zero.
    pub fn is_measurable(&self) -> bool {
        self.pixels > 0 && self.elapsed_secs > 0.0
    }

    /// The progress line, or `None` while resolution or elapsed time is still zero.
    ///
    /// `1:02:05 [Local: 2.00 S/Px - 0.03 S/Sec] [Net (2): 1.00 S/Px - 0.01 S/Sec]`
    pub fn status_line(&self) -> Option<String> {
        if !self.is_measurable() {
            return None;
        }
        let pixels = self.pixels as f64;
        let mut line = format!(
            "{} [Local: {:.2} S/Px - {:.2} S/Sec]",
            format_elapsed_time(self.elapsed_secs),
            self.local_samples / pixels,
            self.local_samples / self.elapsed_secs
        );
        if let Some(network) = self.network.filter(|n| n.servers > 0) {
            line.push_str(&format!(
                " [Net ({}): {:.2} S/Px - {:.2} S/Sec]",
                network.servers,
                network.samples / pixels,
                network.samples / self.elapsed_secs
            ));
        }
        Some(line)
    }

    pub fn total_samples(&self) -> f64 {
        self.local_samples + self.network.map_or(0.0, |n| n.samples)
    }

    /// Network-inclusive summary logged once a render completes.
    pub fn summary(&self) -> Option<String> {
        if !self.is_measurable() {
            return None;
        }
        let samples = self.total_samples();
        Some(format!(
            "Image rendered to {:.2} S/Px after {} at {:.2} Samples/Sec",
            samples / self.pixels as f64,
            format_elapsed_time(self.elapsed_secs),
            samples / self.elapsed_secs
        ))
    }
}

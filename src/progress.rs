use std::io::Write;
use std::sync::{Arc, Mutex};

// Scanline countdown written to an injected sink (stderr in main.rs),
// mirroring the reference renderer's "\rScanlines remaining: N" diagnostic.
pub struct Progress {
    total_scanlines: u32,
    remaining: u32,
    output: Arc<Mutex<dyn Write + Send + Sync>>,
}

impl Progress {
    pub fn new(total_scanlines: u32, output: Arc<Mutex<dyn Write + Send + Sync>>) -> Progress {
        Progress {
            total_scanlines,
            remaining: total_scanlines,
            output,
        }
    }

    // Call once per completed scanline, from any thread.
    pub fn scanline_done(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
        self.print_remaining();
    }

    pub fn done(&mut self) {
        self.remaining = 0;
        let mut_output = &mut *self.output.lock().unwrap();
        mut_output.write("\n".as_bytes()).unwrap();
        mut_output.flush().unwrap();
    }

    fn print_remaining(&self) {
        let line = format!("\rScanlines remaining: {} ", self.remaining);
        let mut_output = &mut *self.output.lock().unwrap();
        mut_output.write(line.as_bytes()).unwrap();
        mut_output.flush().unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scanline_done_counts_down_to_zero() {
        let sink: Arc<Mutex<dyn Write + Send + Sync>> = Arc::new(Mutex::new(Vec::new()));
        let mut progress = Progress::new(2, sink);
        progress.scanline_done();
        assert_eq!(progress.remaining, 1);
        progress.scanline_done();
        assert_eq!(progress.remaining, 0);
        progress.scanline_done();
        assert_eq!(progress.remaining, 0);
    }
}

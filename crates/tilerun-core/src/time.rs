/// Status-bar text for an elapsed time in milliseconds, e.g. `Time: 12.3`.
pub fn format_elapsed(elapsed_ms: f64) -> String {
    format!("Time: {:.1}", elapsed_ms * 0.001)
}

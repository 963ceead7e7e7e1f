/// Recommended construction start period.
///
/// Rounds `crossing_period - lead_time` up to a whole period first, then
/// clamps the result to period 1.
pub fn recommend_start(crossing_period: f64, lead_time: u32) -> u32 {
    let start = (crossing_period - f64::from(lead_time)).ceil();
    // Float-to-int casts saturate and map NaN to 0.
    (start as u32).max(1)
}

/// Round half up toward positive infinity: 20.5 -> 21, -20.5 -> -20.
pub fn round_temperature(celsius: f64) -> i64 {
    let floor = celsius.floor();
    // Adding 0.5 first would round values just below a half up
    let rounded = if celsius - floor >= 0.5 { floor + 1.0 } else { floor };
    // `as` saturates and maps NaN to 0
    rounded as i64
}

/// Render a Celsius value as e.g. "21°C".
pub fn format_temperature(celsius: f64) -> String {
    format!("{}°C", round_temperature(celsius))
}

//! AQI classification.
//!
//! Converts PM2.5 concentrations into US EPA Air Quality Index values and
//! maps those values onto the six EPA air-quality tiers, together with the
//! companion pollen/UV tiers and exercise guidance shown on the dashboard.

use serde::Serialize;

use crate::models::AqiPoint;

// ---

/// EPA PM2.5 breakpoints: `(c_low, c_high, i_low, i_high)`.
///
/// See https://document.airnow.gov/technical-assistance-document-for-the-reporting-of-daily-air-quailty.pdf
const PM25_BREAKPOINTS: [(f64, f64, f64, f64); 6] = [
    (0.0, 12.0, 0.0, 50.0),       // Good
    (12.1, 35.4, 51.0, 100.0),    // Moderate
    (35.5, 55.4, 101.0, 150.0),   // Unhealthy for Sensitive Groups
    (55.5, 150.4, 151.0, 200.0),  // Unhealthy
    (150.5, 250.4, 201.0, 300.0), // Very Unhealthy
    (250.5, 500.4, 301.0, 500.0), // Hazardous
];

/// Air-quality tier for an AQI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AqiCategory {
    Good,
    Moderate,
    Sensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

/// Calculate the AQI for a PM2.5 concentration (µg/m³).
///
/// Uses the band whose upper bound is the first at or above `pm25`, so the
/// 0.1 gaps between published bands fall into the next band and the result
/// stays monotonic. Concentrations above the last band extrapolate with the
/// last band's slope rather than clamping at 500. Negative input is not
/// rejected; the result is floored at 0.
pub fn classify(pm25: f64) -> u32 {
    // ---
    let (c_low, c_high, i_low, i_high) = PM25_BREAKPOINTS
        .iter()
        .copied()
        .find(|&(_, c_high, _, _)| pm25 <= c_high)
        .unwrap_or(PM25_BREAKPOINTS[PM25_BREAKPOINTS.len() - 1]);

    // AQI = ((Ihigh - Ilow) / (Chigh - Clow)) * (C - Clow) + Ilow
    let aqi = ((i_high - i_low) / (c_high - c_low)) * (pm25 - c_low) + i_low;
    aqi.round().max(0.0) as u32
}

/// Map an AQI value onto its EPA tier.
pub fn categorize(aqi: u32) -> AqiCategory {
    match aqi {
        0..=50 => AqiCategory::Good,
        51..=100 => AqiCategory::Moderate,
        101..=150 => AqiCategory::Sensitive,
        151..=200 => AqiCategory::Unhealthy,
        201..=300 => AqiCategory::VeryUnhealthy,
        _ => AqiCategory::Hazardous,
    }
}

/// Everything the dashboard shows about an AQI value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AqiInfo {
    pub value: u32,
    pub category: AqiCategory,
    pub label: &'static str,
    pub description: &'static str,
    pub color: &'static str,
    pub recommendations: &'static [&'static str],
}

pub fn aqi_info(aqi: u32) -> AqiInfo {
    // ---
    let category = categorize(aqi);
    let (label, description, color, recommendations): (_, _, _, &'static [&'static str]) =
        match category {
            AqiCategory::Good => (
                "Good",
                "Air quality is satisfactory, and air pollution poses little or no risk.",
                "#00E400",
                &[
                    "Perfect day for outdoor activities",
                    "Enjoy your time outside",
                    "No precautions needed",
                ],
            ),
            AqiCategory::Moderate => (
                "Moderate",
                "Air quality is acceptable. However, there may be a risk for some people.",
                "#FFFF00",
                &[
                    "Unusually sensitive people should consider limiting prolonged outdoor exertion",
                    "Generally safe for outdoor activities",
                ],
            ),
            AqiCategory::Sensitive => (
                "Unhealthy for Sensitive Groups",
                "Members of sensitive groups may experience health effects.",
                "#FF7E00",
                &[
                    "People with respiratory or heart conditions should limit outdoor exertion",
                    "Children and older adults should reduce prolonged outdoor activities",
                    "General public is less likely to be affected",
                ],
            ),
            AqiCategory::Unhealthy => (
                "Unhealthy",
                "Everyone may begin to experience health effects.",
                "#FF0000",
                &[
                    "Avoid prolonged outdoor exertion",
                    "Sensitive groups should avoid all outdoor activities",
                    "Keep windows and doors closed",
                    "Run air purifiers if available",
                ],
            ),
            AqiCategory::VeryUnhealthy => (
                "Very Unhealthy",
                "Health alert: everyone may experience more serious health effects.",
                "#8F3F97",
                &[
                    "Everyone should avoid all outdoor exertion",
                    "Stay indoors with windows closed",
                    "Run air purifiers on high",
                    "Wear N95 masks if you must go outside",
                ],
            ),
            AqiCategory::Hazardous => (
                "Hazardous",
                "Health warning of emergency conditions. The entire population is likely to be affected.",
                "#7E0023",
                &[
                    "DO NOT GO OUTSIDE",
                    "Remain indoors with all windows and doors closed",
                    "Run air purifiers continuously",
                    "Seek medical attention if experiencing symptoms",
                    "Evacuate if advised by authorities",
                ],
            ),
        };

    AqiInfo {
        value: aqi,
        category,
        label,
        description,
        color,
        recommendations,
    }
}

pub fn pollen_category(level: f64) -> &'static str {
    if level <= 2.4 {
        "Low"
    } else if level <= 4.8 {
        "Moderate"
    } else if level <= 7.2 {
        "High"
    } else {
        "Very High"
    }
}

pub fn uv_category(uv_index: f64) -> &'static str {
    if uv_index <= 2.0 {
        "Low"
    } else if uv_index <= 5.0 {
        "Moderate"
    } else if uv_index <= 7.0 {
        "High"
    } else if uv_index <= 10.0 {
        "Very High"
    } else {
        "Extreme"
    }
}

// ---------------------------------------------------------------------------
// Exercise guidance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseQuality {
    pub label: &'static str,
    pub recommendation: &'static str,
    pub activities: &'static [&'static str],
}

pub fn exercise_quality(aqi: u32) -> ExerciseQuality {
    // ---
    let (label, recommendation, activities): (_, _, &'static [&'static str]) = match aqi {
        0..=50 => (
            "Excellent",
            "Perfect conditions for outdoor activities",
            &["Jogging", "Cycling", "HIIT", "Team Sports"],
        ),
        51..=100 => (
            "Good",
            "Great for most outdoor exercises",
            &["Jogging", "Walking", "Yoga", "Light Sports"],
        ),
        101..=150 => (
            "Moderate",
            "Consider reducing prolonged outdoor exertion",
            &["Walking", "Light Stretching", "Short Sessions"],
        ),
        _ => (
            "Unhealthy",
            "Limit outdoor activities, exercise indoors",
            &["Indoor Gym", "Home Workout", "Rest"],
        ),
    };

    ExerciseQuality {
        label,
        recommendation,
        activities,
    }
}

/// Find the best exercise window in the next 12 trend points.
///
/// Returns `None` for an empty trend. Hours are taken from the point's UTC
/// timestamp shifted by `utc_offset_hours`.
pub fn best_exercise_time(aqi_trend: &[AqiPoint], utc_offset_hours: i32) -> Option<String> {
    // ---
    let best = aqi_trend
        .iter()
        .take(12)
        .reduce(|best, p| if p.aqi < best.aqi { p } else { best })?;

    if best.aqi > 150 {
        return Some("Avoid outdoor exercise today - Air quality unhealthy".to_string());
    }
    if best.aqi <= 50 {
        return Some("Good conditions all day - Safe for outdoor activities".to_string());
    }

    let best_hour = local_hour(best, utc_offset_hours);
    let end_hour = (best_hour + 4).min(20);

    Some(format!(
        "Best time for outdoor exercise: {} - {} (AQI: {})",
        format_hour(best_hour),
        format_hour(end_hour),
        best.aqi
    ))
}

fn local_hour(point: &AqiPoint, utc_offset_hours: i32) -> u32 {
    // ---
    let utc_hour = (point.time.timestamp().rem_euclid(86_400) / 3_600) as i32;
    (utc_hour + utc_offset_hours).rem_euclid(24) as u32
}

fn format_hour(hour: u32) -> String {
    // ---
    let period = if hour >= 12 { "PM" } else { "AM" };
    let display = match hour {
        0 => 12,
        h if h > 12 => h - 12,
        h => h,
    };
    format!("{} {}", display, period)
}

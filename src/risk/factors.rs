//! Per-factor threshold tables

use super::{Risk, RiskFactor, RiskLevel};

/// Rothfusz regression of the NWS heat index, °F in and out
#[must_use]
pub fn heat_index(temperature: f64, humidity: f64) -> f64 {
    let t = temperature;
    let h = humidity;
    -42.379 + 2.049_015_23 * t + 10.143_331_27 * h
        - 0.224_755_41 * t * h
        - 6.837_83e-3 * t * t
        - 5.481_717e-2 * h * h
        + 1.228_74e-3 * t * t * h
        + 8.5282e-4 * t * h * h
        - 1.99e-6 * t * t * h * h
}

pub fn heat_risk(temperature: f64, humidity: f64) -> Risk {
    let index = heat_index(temperature, humidity);
    let (level, explanation) = if index >= 103.0 {
        (RiskLevel::Extreme, "Dangerous heat. Avoid outdoor activity.")
    } else if index >= 90.0 {
        (
            RiskLevel::High,
            "High heat. Limit exertion and stay hydrated.",
        )
    } else if index >= 80.0 {
        (
            RiskLevel::Medium,
            "Warm conditions. Take breaks in the shade.",
        )
    } else {
        (
            RiskLevel::Low,
            "Pleasant conditions. Enjoy your time outdoors.",
        )
    };
    Risk::new(RiskFactor::Heat, level, explanation)
}

pub fn uv_risk(uv_index: f64) -> Risk {
    let (level, explanation) = if uv_index >= 11.0 {
        (
            RiskLevel::Extreme,
            "Extreme risk of harm from unprotected sun exposure.",
        )
    } else if uv_index >= 8.0 {
        // "very high" band shares the top level
        (
            RiskLevel::Extreme,
            "Very high risk of harm from unprotected sun exposure.",
        )
    } else if uv_index >= 6.0 {
        (
            RiskLevel::High,
            "High risk of harm from unprotected sun exposure.",
        )
    } else if uv_index >= 3.0 {
        (
            RiskLevel::Medium,
            "Moderate risk of harm from unprotected sun exposure.",
        )
    } else {
        (
            RiskLevel::Low,
            "Low danger from the sun's UV rays for the average person.",
        )
    };
    Risk::new(RiskFactor::Uv, level, explanation)
}

pub fn aqi_risk(aqi: f64) -> Risk {
    let (level, explanation) = if aqi > 200.0 {
        (
            RiskLevel::Extreme,
            "Health alert: everyone may experience more serious health effects.",
        )
    } else if aqi > 150.0 {
        (
            RiskLevel::High,
            "Everyone may begin to experience health effects; members of sensitive groups may experience more serious health effects.",
        )
    } else if aqi > 100.0 {
        (
            RiskLevel::High,
            "Members of sensitive groups may experience health effects. The general public is not likely to be affected.",
        )
    } else if aqi > 50.0 {
        (
            RiskLevel::Medium,
            "Air quality is acceptable; however, for some pollutants there may be a moderate health concern for a very small number of people.",
        )
    } else {
        (
            RiskLevel::Low,
            "Air quality is considered satisfactory, and air pollution poses little or no risk.",
        )
    };
    Risk::new(RiskFactor::AirQuality, level, explanation)
}

pub fn humidity_discomfort(humidity: f64) -> Risk {
    let (level, explanation) = if humidity > 70.0 {
        (
            RiskLevel::High,
            "High humidity can make it feel warmer and may cause discomfort.",
        )
    } else if humidity > 60.0 {
        (
            RiskLevel::Medium,
            "Humidity is noticeable and may feel slightly muggy.",
        )
    } else {
        (RiskLevel::Low, "Comfortable humidity levels.")
    };
    Risk::new(RiskFactor::Humidity, level, explanation)
}

pub fn rain_exposure(rain_probability: f64) -> Risk {
    let (level, explanation) = if rain_probability > 70.0 {
        (
            RiskLevel::High,
            "High probability of rain. Pack an umbrella.",
        )
    } else if rain_probability > 40.0 {
        (RiskLevel::Medium, "Moderate chance of scattered showers.")
    } else {
        (RiskLevel::Low, "Low chance of rain. Clear skies expected.")
    };
    Risk::new(RiskFactor::Rain, level, explanation)
}

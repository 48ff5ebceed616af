//! Waste verification - Turning classifier output into a structured analysis.
//!
//! Models are asked for a small JSON object but routinely wrap it in markdown
//! fences, return it inside an array, or overestimate the quantity by an order
//! of magnitude. Everything here is pure so it can be tested without a model.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Instruction sent with every image.
pub const ANALYSIS_PROMPT: &str = r#"You are an expert in waste management and recycling. Analyze this image and provide:
1. The type of waste (e.g., plastic, paper, glass, metal, organic)
2. An estimate of the quantity or amount (in kg or liters)
3. Your confidence level in this assessment (as a percentage)

Respond in JSON format like this:
{
    "wasteType": "type of waste",
    "quantity": "estimated quantity with unit",
    "confidence": confidence level as a number between 0 and 1
}"#;

/// A classifier's assessment of a waste photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteAnalysis {
    /// Waste category
    pub waste_type: String,
    /// Estimated quantity with unit
    pub quantity: String,
    /// Confidence between 0 and 1
    pub confidence: f64,
}

fn invalid(message: impl Into<String>) -> Error {
    Error::Verification {
        message: message.into(),
    }
}

/// Parses raw model text into a [`WasteAnalysis`].
///
/// Strips markdown code fences, accepts either an object or an array whose first
/// element is the object, and requires a non-empty waste type, a non-empty
/// quantity and a positive confidence. Confidence may be a number or a numeric
/// string. When `correct` is set the quantity goes through [`correct_quantity`].
pub fn parse_analysis(text: &str, correct: bool) -> Result<WasteAnalysis> {
    let cleaned = text.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(invalid("Received empty response from AI model"));
    }

    let parsed: Value = serde_json::from_str(cleaned)
        .map_err(|e| invalid(format!("Response is not valid JSON: {e}")))?;

    let object = match parsed {
        Value::Array(items) => items
            .into_iter()
            .next()
            .ok_or_else(|| invalid("Response array is empty"))?,
        other => other,
    };

    let waste_type = string_field(&object, "wasteType")
        .ok_or_else(|| invalid("Missing wasteType in response"))?;
    let quantity = string_field(&object, "quantity")
        .ok_or_else(|| invalid("Missing quantity in response"))?;
    let confidence = number_field(&object, "confidence")
        .filter(|c| c.is_finite() && *c > 0.0)
        .ok_or_else(|| invalid("Missing confidence in response"))?;

    let quantity = if correct {
        correct_quantity(&quantity)
    } else {
        quantity
    };

    Ok(WasteAnalysis {
        waste_type,
        quantity,
        confidence,
    })
}

fn string_field(object: &Value, key: &str) -> Option<String> {
    let text = match object.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn number_field(object: &Value, key: &str) -> Option<f64> {
    match object.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
}

/// Scales down a model's quantity estimate, which tends to run an order of magnitude high.
///
/// The first number in the text is rewritten and everything after it kept as the
/// unit; text before the number is dropped. Multi-digit integers lose their last
/// digit, decimals of 10 or more are divided by ten and floored, and anything
/// smaller is halved to two decimals with a floor of 0.1. Text without a number
/// is returned unchanged.
#[must_use]
pub fn correct_quantity(quantity: &str) -> String {
    let Some(start) = quantity.find(|c: char| c.is_ascii_digit()) else {
        return quantity.to_string();
    };
    let rest = &quantity[start..];

    let int_len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let frac_len = rest[int_len..]
        .strip_prefix('.')
        .map_or(0, |after| {
            let digits = after
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(after.len());
            if digits == 0 { 0 } else { digits + 1 }
        });

    let number = &rest[..int_len + frac_len];
    let unit = &rest[int_len + frac_len..];
    let Ok(value) = number.parse::<f64>() else {
        return quantity.to_string();
    };

    let corrected = if frac_len == 0 && number.len() > 1 {
        number[..number.len() - 1].parse::<f64>().unwrap_or(value)
    } else if value >= 10.0 {
        (value / 10.0).floor()
    } else {
        let halved = (value / 2.0 * 100.0).round() / 100.0;
        if halved <= 0.0 { 0.1 } else { halved }
    };

    format!("{corrected}{unit}")
}

use serde_json::Value;

/// Rent figures come out of the back-office records with no unit metadata: a
/// row may hold AED per month, AED per year, or a fils (minor-unit) encoding
/// of either. These magnitude thresholds were tuned against the plausible
/// UAE rental range (roughly 1,000-50,000 AED/month) and are intentionally
/// kept as-is; a genuinely enormous monthly rent above them will be
/// misclassified as annual. The source schema carries no unit tag, so the
/// ambiguity is not resolvable here.
pub const ANNUAL_THRESHOLD: f64 = 60_000.0;
pub const MINOR_UNIT_THRESHOLD: f64 = 600_000.0;
pub const CLAMP_TRIGGER: f64 = 100_000.0;
pub const MONTHLY_CEILING: f64 = 50_000.0;

const FILS_PER_AED: f64 = 100.0;
const MONTHS_PER_YEAR: f64 = 12.0;

/// Best-effort conversion of a raw JSON rent field to `f64`.
///
/// Handles native numbers, numeric strings, and decimal-wrapper objects that
/// expose the figure under a conversion key (`$numberDecimal` from Mongo
/// exports, `value`/`amount` from other serializers). Anything else, blank
/// strings included, degrades to `0.0` rather than erroring: one malformed
/// row must not abort a dashboard aggregation.
pub fn coerce_amount(raw: Option<&Value>) -> f64 {
    match raw {
        None | Some(Value::Null) => 0.0,
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(0.0)
            }
        }
        Some(Value::Object(map)) => map
            .get("$numberDecimal")
            .or_else(|| map.get("value"))
            .or_else(|| map.get("amount"))
            .map(|v| coerce_amount(Some(v)))
            .unwrap_or(0.0),
        Some(_) => 0.0,
    }
}

/// Normalize a raw rent field to canonical monthly AED.
///
/// `label` is only used in the clamp diagnostic (typically the tenant's
/// display name).
pub fn normalize_rent(raw: Option<&Value>, label: &str) -> f64 {
    normalize_amount(coerce_amount(raw), label)
}

/// Magnitude heuristic, applied in order:
///
/// 1. zero / non-finite input returns `0.0`;
/// 2. the sign is dropped;
/// 3. above 600,000 the figure is taken as fils and divided by 100, and if
///    still above 60,000 it is taken as annual and divided by 12;
/// 4. otherwise above 60,000 it is taken as annual and divided by 12;
/// 5. a post-conversion amount above 100,000 is clamped to 50,000 and a
///    warning is logged with the caller's label;
/// 6. the result is rounded to cents.
///
/// Total over its domain: never panics, never returns NaN or a negative.
pub fn normalize_amount(raw: f64, label: &str) -> f64 {
    if !raw.is_finite() || raw == 0.0 {
        return 0.0;
    }

    let mut amount = convert_to_monthly(raw.abs());

    if amount > CLAMP_TRIGGER {
        tracing::warn!(
            "⚠️ Suspicious rent for '{}': raw {} normalized to {:.2}, clamping to {}",
            label,
            raw,
            amount,
            MONTHLY_CEILING
        );
        amount = MONTHLY_CEILING;
    }

    round_cents(amount)
}

/// Whether the heuristic would hit the sanity clamp for this raw figure.
/// Used to park records aside for data-quality review.
pub fn clamp_triggered(raw: f64) -> bool {
    raw.is_finite() && raw != 0.0 && convert_to_monthly(raw.abs()) > CLAMP_TRIGGER
}

fn convert_to_monthly(mut amount: f64) -> f64 {
    if amount > MINOR_UNIT_THRESHOLD {
        // 金額過大：視為 fils 編碼
        amount /= FILS_PER_AED;
        if amount > ANNUAL_THRESHOLD {
            amount /= MONTHS_PER_YEAR;
        }
    } else if amount > ANNUAL_THRESHOLD {
        // 視為年租金
        amount /= MONTHS_PER_YEAR;
    }
    amount
}

/// Standard currency rounding (half away from zero; inputs here are already
/// non-negative, so effectively half-up).
fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

//! Value transforms
//!
//! Transforms turn the raw text of a source element into what gets written
//! at the target element: plain text, or a `numerator`/`denominator` pair.

use mix_ir::{Element, Namespace};

use crate::dsl::TransformKind;
use crate::numeric::parse_operand;

/// Result of transforming a raw source value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformedValue {
    /// Replaces the target element's text
    Text(String),

    /// Appended as `numerator` and `denominator` children
    Pair {
        numerator: String,
        denominator: String,
    },
}

impl TransformedValue {
    /// Write this value into `target`, creating pair children in `namespace`
    pub fn write_into(self, target: &mut Element, namespace: &Namespace) {
        match self {
            Self::Text(text) => {
                target.set_text(text);
            }
            Self::Pair {
                numerator,
                denominator,
            } => {
                target
                    .add_child(Element::new_in("numerator", namespace).with_text(numerator))
                    .add_child(Element::new_in("denominator", namespace).with_text(denominator));
            }
        }
    }
}

/// Transform `raw` according to `kind`
///
/// # Errors
///
/// Returns [`crate::Error::Transform`] when the value does not have the
/// shape the transform requires.
pub fn apply_transform(raw: &str, kind: TransformKind) -> crate::Result<TransformedValue> {
    match kind {
        TransformKind::Identity => Ok(TransformedValue::Text(raw.to_string())),
        TransformKind::RationalToDecimal => rational_to_decimal(raw).map(TransformedValue::Text),
        TransformKind::RationalToPair => {
            let (numerator, denominator) = rational_to_pair(raw)?;
            Ok(TransformedValue::Pair {
                numerator,
                denominator,
            })
        }
    }
}

/// `"a/b"` → decimal string of `a / b`; text without a `/` is returned as is
///
/// # Errors
///
/// Returns an error when either side is not a finite number, when there is
/// more than one `/`, when the denominator is zero, or when the quotient
/// overflows.
pub fn rational_to_decimal(raw: &str) -> crate::Result<String> {
    let Some((numerator, denominator)) = raw.split_once('/') else {
        return Ok(raw.to_string());
    };
    if denominator.contains('/') {
        return Err(crate::Error::transform(raw, "more than one '/' separator"));
    }

    let numerator = parse_operand(numerator, "numerator")?;
    let denominator = parse_operand(denominator, "denominator")?;
    if denominator == 0.0 {
        return Err(crate::Error::transform(raw, "denominator is zero"));
    }

    let quotient = numerator / denominator;
    if !quotient.is_finite() {
        return Err(crate::Error::transform(raw, "quotient is not a finite number"));
    }
    Ok(format_decimal(quotient))
}

/// `"a/b"` → `("a", "b")`, both sides verbatim
///
/// # Errors
///
/// Returns an error when `raw` has no `/` separator.
pub fn rational_to_pair(raw: &str) -> crate::Result<(String, String)> {
    raw.split_once('/')
        .map(|(numerator, denominator)| (numerator.to_string(), denominator.to_string()))
        .ok_or_else(|| crate::Error::transform(raw, "expected a rational 'numerator/denominator'"))
}

/// Render a decimal with at least one fractional digit
pub(crate) fn format_decimal(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

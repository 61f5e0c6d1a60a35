//! Shared checks applied by the value types after parsing.

use std::fmt::Debug;

use crate::error::ValueError;

/// Rejects empty values when the field is required.
pub(crate) fn validate_required(is_empty: bool, required: bool) -> Result<(), ValueError> {
    if required && is_empty {
        return Err(ValueError::Required);
    }
    Ok(())
}

/// Rejects values outside the configured choices.
pub(crate) fn validate_choice<T>(value: &T, choices: Option<&[T]>) -> Result<(), ValueError>
where
    T: PartialEq + Debug,
{
    let Some(choices) = choices else {
        return Ok(());
    };
    if choices.contains(value) {
        return Ok(());
    }
    let names = choices
        .iter()
        .map(|choice| format!("{choice:?}"))
        .collect::<Vec<_>>()
        .join(", ");
    Err(ValueError::Choice {
        value: format!("{value:?}"),
        choices: names,
    })
}

pub(crate) fn validate_minimum<T>(value: T, minimum: Option<T>) -> Result<(), ValueError>
where
    T: PartialOrd + Debug,
{
    match minimum {
        Some(minimum) if value < minimum => Err(ValueError::Minimum {
            value: format!("{value:?}"),
            minimum: format!("{minimum:?}"),
        }),
        _ => Ok(()),
    }
}

pub(crate) fn validate_maximum<T>(value: T, maximum: Option<T>) -> Result<(), ValueError>
where
    T: PartialOrd + Debug,
{
    match maximum {
        Some(maximum) if value > maximum => Err(ValueError::Maximum {
            value: format!("{value:?}"),
            maximum: format!("{maximum:?}"),
        }),
        _ => Ok(()),
    }
}

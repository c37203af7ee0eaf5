use chrono::NaiveDate;
use shared::{
    domain::{SorDraft, SorPriority},
    error::ApiError,
};

/// A creation form that passed every field check.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidDraft {
    pub item_name: String,
    pub quantity: u32,
    pub purpose: String,
    pub estimated_cost: f64,
    pub required_date: NaiveDate,
    pub category: String,
    pub priority: SorPriority,
}

pub fn validate_draft(
    draft: &SorDraft,
    categories: &[String],
    today: NaiveDate,
) -> Result<ValidDraft, ApiError> {
    let item_name = required_text("item_name", draft.item_name.as_deref())?;
    let purpose = required_text("purpose", draft.purpose.as_deref())?;

    let quantity = draft
        .quantity
        .ok_or_else(|| ApiError::validation("quantity", "is required"))?;
    if quantity == 0 {
        return Err(ApiError::validation("quantity", "must be at least 1"));
    }

    let estimated_cost = draft
        .estimated_cost
        .ok_or_else(|| ApiError::validation("estimated_cost", "is required"))?;
    if !estimated_cost.is_finite() || estimated_cost < 0.0 {
        return Err(ApiError::validation(
            "estimated_cost",
            format!("must be a non-negative amount, got {estimated_cost}"),
        ));
    }

    let required_date = draft
        .required_date
        .ok_or_else(|| ApiError::validation("required_date", "is required"))?;
    if required_date < today {
        return Err(ApiError::validation(
            "required_date",
            format!("{required_date} is in the past"),
        ));
    }

    let category = required_text("category", draft.category.as_deref())?;
    if !categories.iter().any(|c| *c == category) {
        return Err(ApiError::validation(
            "category",
            format!("'{category}' is not one of: {}", categories.join(", ")),
        ));
    }

    let priority = draft
        .priority
        .ok_or_else(|| ApiError::validation("priority", "is required"))?;

    Ok(ValidDraft {
        item_name,
        quantity,
        purpose,
        estimated_cost,
        required_date,
        category,
        priority,
    })
}

fn required_text(field: &str, value: Option<&str>) -> Result<String, ApiError> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(ApiError::validation(field, "is required")),
    }
}

#[cfg(test)]
#[path = "tests/drafts_tests.rs"]
mod tests;

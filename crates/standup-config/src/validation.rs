//! Configuration validation

use crate::schema::{RawConfig, RawNotificationConfig, RawReminderConfig};
use chrono::Weekday;
use thiserror::Error;

/// Longest allowed reminder or snooze period: one day
pub const MAX_PERIOD_MINUTES: u32 = 24 * 60;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("reminder.{field} = {value}: must be between 1 and {max} minutes")]
    PeriodOutOfRange {
        field: &'static str,
        value: u32,
        max: u32,
    },

    #[error("reminder.week_start: unknown weekday '{0}'")]
    InvalidWeekday(String),

    #[error("notifications.{0} cannot be empty")]
    EmptyMessage(&'static str),
}

/// Validate a raw configuration, collecting every problem found
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = validate_reminder(&config.reminder);
    errors.extend(validate_notifications(&config.notifications));
    errors
}

fn validate_reminder(reminder: &RawReminderConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (field, value) in [
        ("interval_minutes", reminder.interval_minutes),
        ("snooze_minutes", reminder.snooze_minutes),
    ] {
        if let Some(value) = value
            && (value == 0 || value > MAX_PERIOD_MINUTES)
        {
            errors.push(ValidationError::PeriodOutOfRange {
                field,
                value,
                max: MAX_PERIOD_MINUTES,
            });
        }
    }

    if let Some(raw) = &reminder.week_start
        && parse_week_start(raw).is_err()
    {
        errors.push(ValidationError::InvalidWeekday(raw.clone()));
    }

    errors
}

fn validate_notifications(messages: &RawNotificationConfig) -> Vec<ValidationError> {
    [
        ("reminder_title", &messages.reminder_title),
        ("reminder_body", &messages.reminder_body),
        ("confirmation_title", &messages.confirmation_title),
        ("confirmation_body", &messages.confirmation_body),
        ("snooze_title", &messages.snooze_title),
        ("snooze_body", &messages.snooze_body),
    ]
    .into_iter()
    .filter(|(_, value)| value.as_deref().is_some_and(|s| s.trim().is_empty()))
    .map(|(field, _)| ValidationError::EmptyMessage(field))
    .collect()
}

/// Parse the week-start weekday
pub fn parse_week_start(s: &str) -> Result<Weekday, String> {
    standup_util::parse_weekday(s).ok_or_else(|| format!("Unknown weekday: {}", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(reminder: RawReminderConfig) -> RawConfig {
        RawConfig {
            config_version: 1,
            service: Default::default(),
            reminder,
            notifications: Default::default(),
        }
    }

    #[test]
    fn test_parse_week_start() {
        assert_eq!(parse_week_start("sunday").unwrap(), Weekday::Sun);
        assert_eq!(parse_week_start("MON").unwrap(), Weekday::Mon);
        assert!(parse_week_start("funday").is_err());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let errors = validate_config(&config_with(RawReminderConfig {
            interval_minutes: Some(0),
            ..Default::default()
        }));

        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            ValidationError::PeriodOutOfRange {
                field: "interval_minutes",
                value: 0,
                ..
            }
        ));
    }

    #[test]
    fn collects_every_error() {
        let mut config = config_with(RawReminderConfig {
            interval_minutes: Some(5000),
            active: None,
            snooze_minutes: Some(0),
            week_start: Some("someday".into()),
        });
        config.notifications.snooze_title = Some("   ".into());

        let errors = validate_config(&config);
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().any(|e| matches!(e, ValidationError::InvalidWeekday(_))));
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, ValidationError::EmptyMessage("snooze_title")))
        );
    }

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&config_with(Default::default())).is_empty());
    }
}

//! Request bodies for the rule editing endpoints.

use serde::Deserialize;

use super::{Rule, RuleAssignment};

/// Request body for saving one entity's rule immediately.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRuleRequest {
    pub rule: Rule,
    #[serde(default, alias = "restrictionDays")]
    pub days: Option<i64>,
}

impl UpdateRuleRequest {
    /// RESTRICTED needs a positive day count; other rules carry none.
    pub fn into_assignment(self) -> Result<RuleAssignment, String> {
        match self.rule {
            Rule::Restricted => {
                let days = self
                    .days
                    .filter(|d| *d > 0)
                    .and_then(|d| u32::try_from(d).ok())
                    .ok_or_else(|| {
                        "Restriction days must be a positive number for RESTRICTED rules"
                            .to_string()
                    })?;
                Ok(RuleAssignment::new(Rule::Restricted, Some(days)))
            }
            rule => Ok(RuleAssignment::new(rule, None)),
        }
    }
}

/// Request body for choosing a rule for one entity.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRuleRequest {
    pub rule: Rule,
}

/// Request body for typing a restriction day count.
///
/// `days` is the raw text of the input box and is kept verbatim, so numbers
/// are accepted as well and converted to their textual form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDaysRequest {
    pub days: RawDays,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawDays {
    Text(String),
    Number(i64),
}

impl RawDays {
    pub fn into_text(self) -> String {
        match self {
            RawDays::Text(text) => text,
            RawDays::Number(n) => n.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_days_accepts_text_and_numbers() {
        let text: SetDaysRequest = serde_json::from_str(r#"{"days":"4x"}"#).unwrap();
        assert_eq!(text.days.into_text(), "4x");
        let number: SetDaysRequest = serde_json::from_str(r#"{"days":-5}"#).unwrap();
        assert_eq!(number.days.into_text(), "-5");
    }

    #[test]
    fn test_update_rule_request_validation() {
        let parse = |body: &str| -> Result<RuleAssignment, String> {
            serde_json::from_str::<UpdateRuleRequest>(body)
                .unwrap()
                .into_assignment()
        };

        assert_eq!(
            parse(r#"{"rule":"RESTRICTED","days":45}"#),
            Ok(RuleAssignment::new(Rule::Restricted, Some(45)))
        );
        assert!(parse(r#"{"rule":"RESTRICTED"}"#).is_err());
        assert!(parse(r#"{"rule":"RESTRICTED","days":0}"#).is_err());
        assert!(parse(r#"{"rule":"RESTRICTED","days":-3}"#).is_err());
        assert_eq!(
            parse(r#"{"rule":"NOT_ALLOWED","days":45}"#),
            Ok(RuleAssignment::new(Rule::NotAllowed, None))
        );
    }
}

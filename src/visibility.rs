use serde::{Deserialize, Serialize};

/// Show `target` while radio group `group` has value `trigger`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityRule {
    pub group:    String,
    pub trigger:  String,
    pub target:   String,
    /// Field whose `required` flag follows the target's visibility.
    #[serde(default)]
    pub required: Option<String>
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome<'a> {
    pub target:   &'a str,
    pub visible:  bool,
    pub required: Option<(&'a str, bool)>
}

impl VisibilityRule {
    pub fn new(group: &str, trigger: &str, target: &str, required: Option<&str>) -> Self {
        Self {
            group:    group.to_string(),
            trigger:  trigger.to_string(),
            target:   target.to_string(),
            required: required.map(str::to_string)
        }
    }

    pub fn evaluate(&self, selected: &str) -> RuleOutcome<'_> {
        let visible = selected == self.trigger;
        RuleOutcome {
            target: &self.target,
            visible,
            required: self.required.as_deref().map(|f| (f, visible))
        }
    }
}

impl RuleOutcome<'_> {
    /// CSS `display` value for the target.
    pub fn display(&self) -> &'static str {
        if self.visible {
            "block"
        } else {
            "none"
        }
    }
}

pub fn default_rules() -> Vec<VisibilityRule> {
    vec![
        VisibilityRule::new("viveCon", "Encargado", "encargadoGroup", Some("nombreEncargado")),
        VisibilityRule::new("exalumnaCPN", "Si", "graduacionGroup", None),
        VisibilityRule::new(
            "evaluada",
            "Si",
            "evaluacionDetails",
            Some("evaluacionExplicacion")
        ),
        VisibilityRule::new("terapia", "Si", "terapiaDetails", None)
    ]
}

pub fn rules_for<'a>(
    rules: &'a [VisibilityRule],
    group: &'a str
) -> impl Iterator<Item = &'a VisibilityRule> + 'a {
    rules.iter().filter(move |r| r.group == group)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn guardian_field_follows_living_arrangement() {
        let rules = default_rules();
        let rule = rules_for(&rules, "viveCon").next().unwrap();

        let shown = rule.evaluate("Encargado");
        assert_eq!(
            shown,
            RuleOutcome {
                target:   "encargadoGroup",
                visible:  true,
                required: Some(("nombreEncargado", true))
            }
        );
        assert_eq!(shown.display(), "block");

        let hidden = rule.evaluate("Ambos padres");
        assert!(!hidden.visible);
        assert_eq!(hidden.required, Some(("nombreEncargado", false)));
        assert_eq!(hidden.display(), "none");
    }

    #[test]
    fn optional_sections_do_not_touch_required() {
        let rules = default_rules();
        let rule = rules_for(&rules, "terapia").next().unwrap();
        assert_eq!(rule.evaluate("Si").required, None);
        assert!(rule.evaluate("Si").visible);
        assert!(!rule.evaluate("No").visible);
    }

    #[test]
    fn trigger_match_is_exact() {
        let rule = VisibilityRule::new("exalumnaCPN", "Si", "graduacionGroup", None);
        assert!(!rule.evaluate("si").visible);
        assert!(!rule.evaluate("").visible);
    }

    #[test]
    fn unknown_group_has_no_rules() {
        assert_eq!(rules_for(&default_rules(), "colegio").count(), 0);
    }

    #[test]
    fn rules_deserialize_from_camel_case() {
        let rule: VisibilityRule = serde_json::from_str(
            r#"{"group":"evaluada","trigger":"Si","target":"evaluacionDetails"}"#
        )
        .unwrap();
        assert_eq!(rule.required, None);
        assert_eq!(rule.target, "evaluacionDetails");
    }
}

//! Records → page requests.
//!
//! Every record goes through the same four steps:
//!
//! ```text
//! record ─► derive_path ─► route_params ─► reverse_lookup_params ─► match_path
//!             │               │                 │
//!             │               │                 └─ FieldError: policy
//!             │               └─ ParamError: logged, record skipped
//!             └─ FieldError: policy (skip record / abort run)
//! ```
//!
//! The whole run is computed here before anything reaches the page sink.

use crate::{
    config::MissingFieldPolicy,
    log,
    pages::{PAGE_PARAMS_KEY, PageRequest},
};
use pagegen_core::{
    DeriveOptions, FieldError, Pattern, derive_path, match_path, reverse_lookup_params,
    route_params,
};
use rustc_hash::FxHashSet;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

/// Pages of one run, in record order.
#[derive(Debug, Default)]
pub struct Plan {
    pub pages: Vec<PageRequest>,
    pub skipped: usize,
}

/// A record failed under [`MissingFieldPolicy::Abort`].
#[derive(Debug, Error)]
#[error("record {index}: {source}")]
pub struct Aborted {
    pub index: usize,
    #[source]
    pub source: FieldError,
}

pub struct Planner<'a> {
    pub pattern: &'a Pattern,
    pub component: &'a Path,
    pub derive: DeriveOptions,
    pub on_missing_field: MissingFieldPolicy,
}

impl Planner<'_> {
    pub fn plan(&self, nodes: &[Value]) -> Result<Plan, Aborted> {
        let mut plan = Plan::default();
        let mut seen = FxHashSet::default();

        for (index, record) in nodes.iter().enumerate() {
            let page = match self.page(record) {
                Ok(Some(page)) => page,
                Ok(None) => {
                    plan.skipped += 1;
                    continue;
                }
                Err(source) if self.on_missing_field == MissingFieldPolicy::Abort => {
                    return Err(Aborted { index, source });
                }
                Err(err) => {
                    log!("warn"; "{}: skipping record {index}: {err}", self.pattern.source());
                    plan.skipped += 1;
                    continue;
                }
            };

            if !seen.insert(page.path.clone()) {
                log!("warn"; "{}: record {index} duplicates path {}, keeping the first",
                    self.pattern.source(), page.path);
                plan.skipped += 1;
                continue;
            }
            plan.pages.push(page);
        }

        Ok(plan)
    }

    /// `Ok(None)` when the derived path does not line up with the pattern.
    fn page(&self, record: &Value) -> Result<Option<PageRequest>, FieldError> {
        let derived = derive_path(self.pattern, record, self.derive)?;

        let params = match route_params(self.pattern, derived.as_str()) {
            Ok(params) => params,
            Err(err) => {
                log!("error"; "internal: {err}");
                return Ok(None);
            }
        };
        let mut context = reverse_lookup_params(record, self.pattern)?;
        context.insert(
            PAGE_PARAMS_KEY.to_owned(),
            Value::Object(
                params
                    .into_iter()
                    .map(|(name, value)| (name, Value::String(value)))
                    .collect(),
            ),
        );

        let match_path = match_path(&derived, self.pattern).map(|m| m.into_string());
        Ok(Some(PageRequest {
            path: derived.into_string(),
            match_path,
            component: self.component.to_path_buf(),
            context,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagegen_core::pattern::DEFAULT_PREFIX;
    use serde_json::json;

    fn planner(pattern: &Pattern, policy: MissingFieldPolicy) -> Planner<'_> {
        Planner {
            pattern,
            component: Path::new("/site/src/pages/c.js"),
            derive: DeriveOptions::default(),
            on_missing_field: policy,
        }
    }

    fn pattern(path: &str) -> Pattern {
        Pattern::parse(path, DEFAULT_PREFIX).unwrap()
    }

    #[test]
    fn test_plan_products_context() {
        let pattern = pattern("products/{unstable_category}/{unstable_id}.js");
        let nodes = [json!({ "category": "shoes", "id": 42, "price": 10 })];

        let plan = planner(&pattern, MissingFieldPolicy::Skip).plan(&nodes).unwrap();
        let page = &plan.pages[0];

        assert_eq!(page.path, "/products/shoes/42");
        assert_eq!(page.match_path, None);
        assert_eq!(
            Value::Object(page.context.clone()),
            json!({
                "category": "shoes",
                "id": 42,
                "__params": { "category": "shoes", "id": "42" },
            })
        );
    }

    #[test]
    fn test_plan_optional_match_path() {
        let pattern = pattern("blog/{unstable_slug?}.js");
        let nodes = [json!({ "slug": "my-post" })];

        let plan = planner(&pattern, MissingFieldPolicy::Skip).plan(&nodes).unwrap();

        assert_eq!(plan.pages[0].match_path.as_deref(), Some("/blog(/my\\-post)?"));
    }

    #[test]
    fn test_plan_skip_policy() {
        let pattern = pattern("items/{unstable_id}.js");
        let nodes = [json!({ "id": 1 }), json!({ "name": "x" }), json!({ "id": 3 })];

        let plan = planner(&pattern, MissingFieldPolicy::Skip).plan(&nodes).unwrap();
        let paths: Vec<_> = plan.pages.iter().map(|p| p.path.as_str()).collect();

        assert_eq!(paths, ["/items/1", "/items/3"]);
        assert_eq!(plan.skipped, 1);
    }

    #[test]
    fn test_plan_abort_policy() {
        let pattern = pattern("items/{unstable_id}.js");
        let nodes = [json!({ "id": 1 }), json!({ "id": [1] })];

        let err = planner(&pattern, MissingFieldPolicy::Abort)
            .plan(&nodes)
            .unwrap_err();

        assert_eq!(err.index, 1);
        assert!(matches!(err.source, FieldError::Unsupported { .. }));
    }

    #[test]
    fn test_plan_duplicate_paths_keep_first() {
        let pattern = pattern("items/{unstable_id}.js");
        let nodes = [
            json!({ "id": 1, "v": "first" }),
            json!({ "id": 1, "v": "second" }),
        ];

        let plan = planner(&pattern, MissingFieldPolicy::Skip).plan(&nodes).unwrap();

        assert_eq!(plan.pages.len(), 1);
        assert_eq!(plan.skipped, 1);
        assert_eq!(plan.pages[0].component, Path::new("/site/src/pages/c.js"));
    }
}

//! Component H — Spec Selection Pipeline.
//!
//! Stage A narrows every spec under the tests root down to those that bind
//! at least one impacted fixture key. Stage B walks the survivors (plus any
//! directly-changed or import-matched spec) and classifies each fixture
//! call site as precise or uncertain, applying the configured bias policy.

use crate::domain::config::SelectionBias;
use crate::domain::model::{ClassName, FixtureKey, MethodsByClass, SelectionReason};
use crate::domain::ports::SourceAstParser;
use crate::errors::{Warning, WarningKind};
use crate::features::fixture_map::FixtureMap;
use crate::parsing::destructuring::fixture_bindings;
use crate::parsing::fixture_calls::{alias_bindings, fixture_call_sites, FixtureCallShape};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedSpec {
    pub path: PathBuf,
    pub reason: SelectionReason,
}

#[derive(Debug, Clone, Default)]
pub struct SpecSelectionResult {
    pub selected: Vec<SelectedSpec>,
    pub warnings: Vec<Warning>,
    pub uncertain_call_sites: u64,
    pub stage_a_survivors: usize,
}

/// Stage A: every spec that destructures at least one fixture key present
/// in `impacted_fixture_keys`.
pub fn stage_a_prefilter(
    spec_files: &[PathBuf],
    spec_contents: &HashMap<PathBuf, String>,
    impacted_fixture_keys: &HashSet<FixtureKey>,
    parser: &dyn SourceAstParser,
) -> HashSet<PathBuf> {
    spec_files
        .iter()
        .filter(|path| {
            let Some(source) = spec_contents.get(*path) else {
                return false;
            };
            let Some(ast) = parser.parse(source) else {
                return false;
            };
            fixture_bindings(ast.root(), &ast.source)
                .iter()
                .any(|binding| impacted_fixture_keys.contains(&binding.fixture_key))
        })
        .cloned()
        .collect()
}

/// Stage B, plus the final merge/sort. `candidates`
/// is the union of Stage A survivors, directly-changed specs, and
/// import-graph matches — the three sets considered for Stage B.
/// `stage_a_survivor_count` is the size of the Stage A prefilter's own
/// output, which is not
/// generally equal to `candidates.len()` since `candidates` also folds in
/// directly-changed and import-matched specs that never went through Stage A.
#[allow(clippy::too_many_arguments)]
pub fn stage_b_and_merge(
    candidates: &HashSet<PathBuf>,
    spec_contents: &HashMap<PathBuf, String>,
    read_errors: &HashSet<PathBuf>,
    directly_changed: &HashSet<PathBuf>,
    import_matched: &HashSet<PathBuf>,
    fixture_map: &FixtureMap,
    impacted_methods_by_class: &MethodsByClass,
    bias: SelectionBias,
    parser: &dyn SourceAstParser,
    stage_a_survivor_count: usize,
) -> SpecSelectionResult {
    let mut selected = Vec::new();
    let mut warnings = Vec::new();
    let mut uncertain_call_sites = 0u64;

    let mut sorted_candidates: Vec<&PathBuf> = candidates.iter().collect();
    sorted_candidates.sort();

    for path in sorted_candidates {
        // Priority order: direct change, import-graph match, read error,
        // then the fixture-binding and impact classification below.
        if directly_changed.contains(path) {
            selected.push(SelectedSpec {
                path: path.clone(),
                reason: SelectionReason::DirectChangedSpec,
            });
            continue;
        }
        if import_matched.contains(path) {
            selected.push(SelectedSpec {
                path: path.clone(),
                reason: SelectionReason::MatchedImportGraph,
            });
            continue;
        }
        if read_errors.contains(path) {
            selected.push(SelectedSpec {
                path: path.clone(),
                reason: SelectionReason::RetainedReadError,
            });
            continue;
        }

        let Some(source) = spec_contents.get(path) else {
            // No content and no recorded read error: treat the same as an
            // unreadable file, since dropping a spec we cannot analyze
            // would silently lose coverage.
            warnings.push(Warning::new(
                WarningKind::UnreadableFile,
                path.display().to_string(),
                "spec content unavailable".to_string(),
            ));
            selected.push(SelectedSpec {
                path: path.clone(),
                reason: SelectionReason::RetainedReadError,
            });
            continue;
        };

        let Some(ast) = parser.parse(source) else {
            warnings.push(Warning::new(
                WarningKind::UnreadableFile,
                path.display().to_string(),
                "spec could not be parsed".to_string(),
            ));
            selected.push(SelectedSpec {
                path: path.clone(),
                reason: SelectionReason::RetainedReadError,
            });
            continue;
        };

        let fixture_var_classes: HashMap<String, ClassName> = fixture_bindings(ast.root(), &ast.source)
            .into_iter()
            .filter_map(|binding| fixture_map.fixture_key_to_class.get(&binding.fixture_key).map(|class| (binding.local_name, class.clone())))
            .collect();

        if fixture_var_classes.is_empty() {
            selected.push(SelectedSpec {
                path: path.clone(),
                reason: SelectionReason::RetainedNoBindings,
            });
            continue;
        }

        if impacted_methods_by_class.is_empty() {
            selected.push(SelectedSpec {
                path: path.clone(),
                reason: SelectionReason::RetainedNoImpactedMethods,
            });
            continue;
        }

        let aliases = alias_bindings(ast.root(), &ast.source);
        let mut precise = 0u64;
        let mut uncertain = 0u64;

        for site in fixture_call_sites(ast.root(), &ast.source) {
            match site {
                FixtureCallShape::Direct { root, name, depth } => {
                    let Some(class) = fixture_var_classes.get(&root) else {
                        continue;
                    };
                    if depth <= 2 {
                        if impacted_methods_by_class.get(class).map(|m| m.contains(&name)).unwrap_or(false) {
                            precise += 1;
                        }
                    } else {
                        uncertain += 1;
                        warnings.push(Warning::new(
                            WarningKind::DeepChain,
                            path.display().to_string(),
                            format!("{root}.{{...}}.{name}(...) exceeds chain depth 2"),
                        ));
                    }
                }
                FixtureCallShape::DynamicIndex { root } => {
                    if fixture_var_classes.contains_key(&root) {
                        uncertain += 1;
                        warnings.push(Warning::new(
                            WarningKind::DynamicDispatch,
                            path.display().to_string(),
                            format!("{root}[<non-literal>](...) against a fixture variable"),
                        ));
                    }
                }
                FixtureCallShape::BareCall { name } => {
                    if aliases.contains(&name) {
                        uncertain += 1;
                        warnings.push(Warning::new(
                            WarningKind::AliasUsage,
                            path.display().to_string(),
                            format!("{name}(...) is called through a tracked alias/destructure"),
                        ));
                    }
                }
            }
        }

        uncertain_call_sites += uncertain;

        if precise > 0 {
            selected.push(SelectedSpec {
                path: path.clone(),
                reason: SelectionReason::MatchedPrecise,
            });
        } else if bias.keeps_on_uncertainty() && uncertain > 0 {
            selected.push(SelectedSpec {
                path: path.clone(),
                reason: SelectionReason::MatchedUncertainFailOpen,
            });
        }
        // Else: dropped (step 9).
    }

    selected.sort_by(|a, b| a.path.cmp(&b.path));

    SpecSelectionResult {
        selected,
        warnings,
        uncertain_call_sites,
        stage_a_survivors: stage_a_survivor_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ClassName as Class;
    use crate::parsing::TreeSitterTsParser;

    fn fixture_map_with(key: &str, class: &str) -> FixtureMap {
        let mut map = FixtureMap::default();
        map.fixture_key_to_class.insert(key.to_string(), class.to_string());
        map.class_to_fixture_keys.entry(class.to_string()).or_default().insert(key.to_string());
        map
    }

    fn impacted(class: &str, methods: &[&str]) -> MethodsByClass {
        let mut m = MethodsByClass::new();
        m.insert(class.to_string(), methods.iter().map(|s| s.to_string()).collect());
        m
    }

    #[test]
    fn precise_direct_call_is_selected() {
        let src = "test('x', async ({ myPage }) => { await myPage.open(); });";
        let mut contents = HashMap::new();
        contents.insert(PathBuf::from("basic.spec.ts"), src.to_string());
        let candidates: HashSet<PathBuf> = [PathBuf::from("basic.spec.ts")].into_iter().collect();

        let result = stage_b_and_merge(
            &candidates,
            &contents,
            &HashSet::new(),
            &HashSet::new(),
            &HashSet::new(),
            &fixture_map_with("myPage", "MyPage"),
            &impacted("MyPage", &["open"]),
            SelectionBias::FailOpen,
            &TreeSitterTsParser::new(),
            candidates.len(),
        );
        assert_eq!(result.selected.len(), 1);
        assert_eq!(result.selected[0].reason, SelectionReason::MatchedPrecise);
    }

    #[test]
    fn dynamic_dispatch_fail_open_vs_fail_closed() {
        let src = "test('x', async ({ myPage }) => { const k = 'open'; await myPage[k](); });";
        let mut contents = HashMap::new();
        contents.insert(PathBuf::from("basic.spec.ts"), src.to_string());
        let candidates: HashSet<PathBuf> = [PathBuf::from("basic.spec.ts")].into_iter().collect();
        let class_name: ClassName = "MyPage".into();
        let _ = &class_name;

        let open_result = stage_b_and_merge(
            &candidates,
            &contents,
            &HashSet::new(),
            &HashSet::new(),
            &HashSet::new(),
            &fixture_map_with("myPage", "MyPage"),
            &impacted("MyPage", &["open"]),
            SelectionBias::FailOpen,
            &TreeSitterTsParser::new(),
            candidates.len(),
        );
        assert_eq!(open_result.selected.len(), 1);
        assert_eq!(open_result.selected[0].reason, SelectionReason::MatchedUncertainFailOpen);
        assert!(open_result.uncertain_call_sites >= 1);

        let closed_result = stage_b_and_merge(
            &candidates,
            &contents,
            &HashSet::new(),
            &HashSet::new(),
            &HashSet::new(),
            &fixture_map_with("myPage", "MyPage"),
            &impacted("MyPage", &["open"]),
            SelectionBias::FailClosed,
            &TreeSitterTsParser::new(),
            candidates.len(),
        );
        assert!(closed_result.selected.is_empty());
    }

    #[test]
    fn no_bindings_is_retained() {
        let src = "test('x', async (fixtures) => { fixtures.myPage.open(); });";
        let mut contents = HashMap::new();
        contents.insert(PathBuf::from("basic.spec.ts"), src.to_string());
        let candidates: HashSet<PathBuf> = [PathBuf::from("basic.spec.ts")].into_iter().collect();

        let result = stage_b_and_merge(
            &candidates,
            &contents,
            &HashSet::new(),
            &HashSet::new(),
            &HashSet::new(),
            &fixture_map_with("myPage", "MyPage"),
            &impacted("MyPage", &["open"]),
            SelectionBias::FailOpen,
            &TreeSitterTsParser::new(),
            candidates.len(),
        );
        assert_eq!(result.selected[0].reason, SelectionReason::RetainedNoBindings);
    }

    #[test]
    fn empty_impacted_methods_retains_all_candidates() {
        let src = "test('x', async ({ myPage }) => { await myPage.open(); });";
        let mut contents = HashMap::new();
        contents.insert(PathBuf::from("basic.spec.ts"), src.to_string());
        let candidates: HashSet<PathBuf> = [PathBuf::from("basic.spec.ts")].into_iter().collect();

        let result = stage_b_and_merge(
            &candidates,
            &contents,
            &HashSet::new(),
            &HashSet::new(),
            &HashSet::new(),
            &fixture_map_with("myPage", "MyPage"),
            &MethodsByClass::new(),
            SelectionBias::FailClosed,
            &TreeSitterTsParser::new(),
            candidates.len(),
        );
        assert_eq!(result.selected[0].reason, SelectionReason::RetainedNoImpactedMethods);
    }

    #[test]
    fn directly_changed_spec_wins_over_everything_else() {
        let src = "test('x', async ({ myPage }) => {});";
        let mut contents = HashMap::new();
        contents.insert(PathBuf::from("basic.spec.ts"), src.to_string());
        let candidates: HashSet<PathBuf> = [PathBuf::from("basic.spec.ts")].into_iter().collect();
        let direct: HashSet<PathBuf> = [PathBuf::from("basic.spec.ts")].into_iter().collect();

        let result = stage_b_and_merge(
            &candidates,
            &contents,
            &HashSet::new(),
            &direct,
            &HashSet::new(),
            &FixtureMap::default(),
            &MethodsByClass::new(),
            SelectionBias::FailClosed,
            &TreeSitterTsParser::new(),
            candidates.len(),
        );
        assert_eq!(result.selected[0].reason, SelectionReason::DirectChangedSpec);
    }

    #[test]
    fn read_error_is_retained() {
        let candidates: HashSet<PathBuf> = [PathBuf::from("basic.spec.ts")].into_iter().collect();
        let read_errors: HashSet<PathBuf> = [PathBuf::from("basic.spec.ts")].into_iter().collect();

        let result = stage_b_and_merge(
            &candidates,
            &HashMap::new(),
            &read_errors,
            &HashSet::new(),
            &HashSet::new(),
            &FixtureMap::default(),
            &MethodsByClass::new(),
            SelectionBias::FailClosed,
            &TreeSitterTsParser::new(),
            candidates.len(),
        );
        assert_eq!(result.selected[0].reason, SelectionReason::RetainedReadError);
    }

    #[test]
    fn irrelevant_method_without_impact_is_dropped() {
        let src = "test('x', async ({ myPage }) => { await myPage.unrelated(); });";
        let mut contents = HashMap::new();
        contents.insert(PathBuf::from("basic.spec.ts"), src.to_string());
        let candidates: HashSet<PathBuf> = [PathBuf::from("basic.spec.ts")].into_iter().collect();

        let result = stage_b_and_merge(
            &candidates,
            &contents,
            &HashSet::new(),
            &HashSet::new(),
            &HashSet::new(),
            &fixture_map_with("myPage", "MyPage"),
            &impacted("MyPage", &["open"]),
            SelectionBias::FailOpen,
            &TreeSitterTsParser::new(),
            candidates.len(),
        );
        assert!(result.selected.is_empty());
    }
}

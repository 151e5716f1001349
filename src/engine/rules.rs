//! Declarative rule tables.
//!
//! A service is described by an ordered list of [`CategoryRule`]s. Each one
//! says how to recognise its beans (a [`Marker`]), which labels every sample
//! carries, and an ordered list of [`KeyRule`]s that classify metric keys.
//! Both lists are evaluated first-match-wins; a key no rule claims is a plain
//! scalar.

use crate::engine::family::{LabelSchema, MetricKind};
use crate::engine::naming::snake_case;
use crate::engine::state::StateTable;
use crate::snapshot::SnapshotRecord;

/// How a category recognises its beans from the bean `name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Exact `key=value` ObjectName property, e.g. `sub=Regions`.
    Property(&'static str, &'static str),
    /// Bare substring of the bean name.
    Contains(&'static str),
}

impl Marker {
    pub fn matches(&self, record: &SnapshotRecord) -> bool {
        match self {
            Marker::Property(key, value) => record.property(key) == Some(*value),
            Marker::Contains(needle) => record.name().contains(needle),
        }
    }
}

/// What to do with a catalog key the bean does not report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPolicy {
    /// Walk the catalog and report absent keys as `0`.
    Zero,
    /// Walk the bean and skip catalog keys it does not report.
    Omit,
}

/// A label every sample of a category carries after `cluster`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseLabel {
    /// `tag.Hostname` of the bean, or the snapshot-wide host.
    Host,
    /// ObjectName property of the bean name.
    Property {
        label: &'static str,
        property: &'static str,
    },
    /// `tag.<tag>` field of the bean.
    Tag {
        label: &'static str,
        tag: &'static str,
    },
}

impl BaseLabel {
    pub fn name(&self) -> &'static str {
        match self {
            BaseLabel::Host => "host",
            BaseLabel::Property { label, .. } | BaseLabel::Tag { label, .. } => label,
        }
    }
}

/// A category whose value is a serialized list of entity descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateRule {
    pub field: &'static str,
    /// `(label, entity field)` pairs appended to the base labels.
    pub labels: &'static [(&'static str, &'static str)],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityLayout {
    /// `…<kind>_<token>_metric_<suffix>`; derived key `<kind>_metric_<suffix>`.
    Infix { kind: &'static str },
    /// `<…stem…>_<n>`; derived key drops `_<n>`, label value `<prefix><n>`.
    Numbered {
        stem: &'static str,
        token_prefix: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityRule {
    pub label: &'static str,
    pub layout: EntityLayout,
}

const METRIC_SEPARATOR: &str = "_metric_";

impl EntityRule {
    /// Returns the derived key and the token, `None` for a template key that
    /// already has the token removed.
    fn split(&self, key: &str) -> Option<(String, Option<String>)> {
        match self.layout {
            EntityLayout::Infix { kind } => {
                let (head, suffix) = key.split_once(METRIC_SEPARATOR)?;
                if suffix.is_empty() {
                    return None;
                }
                let derived = format!("{kind}{METRIC_SEPARATOR}{suffix}");
                if head == kind {
                    return Some((derived, None));
                }
                // The first marker at a segment boundary; the token itself
                // may contain `_` or the marker text.
                let marker = format!("{kind}_");
                let pos = head
                    .match_indices(&marker)
                    .map(|(pos, _)| pos)
                    .find(|&pos| pos == 0 || head[..pos].ends_with('_'))?;
                let token = &head[pos + marker.len()..];
                if token.is_empty() {
                    return None;
                }
                Some((derived, Some(token.to_string())))
            }
            EntityLayout::Numbered { stem, token_prefix } => {
                if !key.contains(stem) {
                    return None;
                }
                match key.rsplit_once('_') {
                    Some((head, n))
                        if !n.is_empty()
                            && n.chars().all(|c| c.is_ascii_digit())
                            && head.contains(stem) =>
                    {
                        Some((head.to_string(), Some(format!("{token_prefix}{n}"))))
                    }
                    _ => Some((key.to_string(), None)),
                }
            }
        }
    }
}

/// Percentile latencies reported per time window, e.g.
/// `Syncs60sNumOps` and `Syncs60s95thPercentileLatencyMicros`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRule {
    pub marker: &'static str,
    pub ops_suffix: &'static str,
    pub percentile_suffix: &'static str,
    pub name_stem: &'static str,
    pub name_suffix: &'static str,
    /// Help text; `{window}` is replaced by the window size in seconds.
    pub help: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPoint {
    Ops,
    Percentile(u32),
}

impl WindowRule {
    fn split(&self, key: &str) -> Option<(u32, WindowPoint)> {
        let rest = key.strip_prefix(self.marker)?;
        let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
        if digits == 0 {
            return None;
        }
        let window: u32 = rest[..digits].parse().ok()?;
        let rest = rest[digits..].strip_prefix('s')?;
        if rest == self.ops_suffix {
            return Some((window, WindowPoint::Ops));
        }
        let percentile = rest.strip_suffix(self.percentile_suffix)?;
        if percentile.is_empty() || !percentile.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        Some((window, WindowPoint::Percentile(percentile.parse().ok()?)))
    }
}

/// A variable phase, method or mode name wrapped in a fixed prefix/suffix,
/// collapsed into one family with an extra label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRule {
    pub prefix: &'static str,
    pub suffix: &'static str,
    pub label: &'static str,
    pub family: &'static str,
    pub name: Option<&'static str>,
    pub help: &'static str,
    /// Claim every key; keys without the suffix use the whole key as token.
    pub catch_all: bool,
    pub translate: &'static [(&'static str, &'static str)],
}

impl IndexRule {
    pub fn new(
        suffix: &'static str,
        label: &'static str,
        family: &'static str,
        help: &'static str,
    ) -> Self {
        Self {
            prefix: "",
            suffix,
            label,
            family,
            name: None,
            help,
            catch_all: false,
            translate: &[],
        }
    }

    pub fn prefix(mut self, prefix: &'static str) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn named(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    pub fn catch_all(mut self) -> Self {
        self.catch_all = true;
        self
    }

    pub fn translate(mut self, pairs: &'static [(&'static str, &'static str)]) -> Self {
        self.translate = pairs;
        self
    }

    fn token(&self, key: &str) -> Option<String> {
        let token = match key
            .strip_prefix(self.prefix)
            .and_then(|rest| rest.strip_suffix(self.suffix))
        {
            Some(token) if !token.is_empty() => token,
            _ if self.catch_all => key
                .strip_suffix(self.suffix)
                .filter(|token| !token.is_empty())
                .unwrap_or(key),
            _ => return None,
        };
        let translated = self
            .translate
            .iter()
            .find(|(from, _)| *from == token)
            .map(|(_, to)| *to)
            .unwrap_or(token);
        Some(translated.to_string())
    }
}

/// Where an enumerated state string is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateSource {
    /// The metric key itself.
    Field,
    /// A `tag.<name>` field of the same bean.
    Tag(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateRule {
    pub key: &'static str,
    pub table: StateTable,
    pub source: StateSource,
    pub name: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRule {
    Entity(EntityRule),
    Windowed(WindowRule),
    Indexed(IndexRule),
    State(StateRule),
    /// Scalar key exported under a fixed name.
    Named {
        key: &'static str,
        name: &'static str,
        help: Option<&'static str>,
    },
}

impl KeyRule {
    pub fn entity(label: &'static str, kind: &'static str) -> Self {
        KeyRule::Entity(EntityRule {
            label,
            layout: EntityLayout::Infix { kind },
        })
    }

    pub fn numbered(label: &'static str, stem: &'static str, token_prefix: &'static str) -> Self {
        KeyRule::Entity(EntityRule {
            label,
            layout: EntityLayout::Numbered { stem, token_prefix },
        })
    }

    pub fn state(key: &'static str, table: StateTable, source: StateSource) -> Self {
        KeyRule::State(StateRule {
            key,
            table,
            source,
            name: None,
        })
    }

    pub fn named(key: &'static str, name: &'static str) -> Self {
        KeyRule::Named {
            key,
            name,
            help: None,
        }
    }

    fn classify(&self, key: &str) -> Option<Classified<'_>> {
        match self {
            KeyRule::Entity(rule) => {
                let (derived, token) = rule.split(key)?;
                Some(Classified {
                    derived,
                    shape: Shape::Entity {
                        label: rule.label,
                        token,
                    },
                })
            }
            KeyRule::Windowed(rule) => {
                let (window, point) = rule.split(key)?;
                Some(Classified {
                    derived: format!("{}{}s", rule.marker, window),
                    shape: Shape::Windowed {
                        rule,
                        window,
                        point,
                    },
                })
            }
            KeyRule::Indexed(rule) => {
                let token = rule.token(key)?;
                Some(Classified {
                    derived: rule.family.to_string(),
                    shape: Shape::Indexed { rule, token },
                })
            }
            KeyRule::State(rule) if rule.key == key => Some(Classified {
                derived: key.to_string(),
                shape: Shape::State(rule),
            }),
            KeyRule::Named { key: k, name, help } if *k == key => Some(Classified {
                derived: key.to_string(),
                shape: Shape::Scalar {
                    name: Some(name),
                    help: *help,
                },
            }),
            _ => None,
        }
    }
}

/// Result of classifying one metric key.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified<'r> {
    /// Canonical key shared by every raw variant of the same family.
    pub derived: String,
    pub shape: Shape<'r>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape<'r> {
    Scalar {
        name: Option<&'static str>,
        help: Option<&'static str>,
    },
    Entity {
        label: &'static str,
        token: Option<String>,
    },
    Windowed {
        rule: &'r WindowRule,
        window: u32,
        point: WindowPoint,
    },
    Indexed {
        rule: &'r IndexRule,
        token: String,
    },
    State(&'r StateRule),
}

impl Classified<'_> {
    pub fn kind(&self) -> MetricKind {
        match self.shape {
            Shape::Windowed { .. } => MetricKind::Histogram,
            _ => MetricKind::Gauge,
        }
    }

    /// Label appended to the base schema, if the shape has one.
    pub fn extra_label(&self) -> Option<&'static str> {
        match &self.shape {
            Shape::Entity { label, .. } => Some(label),
            Shape::Indexed { rule, .. } => Some(rule.label),
            _ => None,
        }
    }

    /// Family name without the global prefix and category segment.
    pub fn name(&self) -> String {
        match &self.shape {
            Shape::Scalar {
                name: Some(name), ..
            } => name.to_string(),
            Shape::Windowed { rule, window, .. } => {
                format!("{}{}s_{}", rule.name_stem, window, rule.name_suffix)
            }
            Shape::Indexed { rule, .. } => rule
                .name
                .map(str::to_string)
                .unwrap_or_else(|| snake_case(rule.family)),
            Shape::State(rule) => rule
                .name
                .map(str::to_string)
                .unwrap_or_else(|| snake_case(&self.derived)),
            _ => snake_case(&self.derived),
        }
    }

    /// Rule-level help wins over the catalog description.
    pub fn help(&self, description: &str) -> String {
        match &self.shape {
            Shape::Scalar { help: Some(help), .. } => help.to_string(),
            Shape::Windowed { rule, window, .. } => {
                rule.help.replace("{window}", &window.to_string())
            }
            Shape::Indexed { rule, .. } => rule.help.to_string(),
            _ => description.to_string(),
        }
    }
}

/// How one category of a service is recognised and shaped.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRule {
    pub category: &'static str,
    pub marker: Marker,
    pub segment: &'static str,
    pub base_labels: Vec<BaseLabel>,
    pub missing: MissingPolicy,
    pub require_tag: Option<(&'static str, &'static str)>,
    pub keys: Vec<KeyRule>,
    pub aggregate: Option<AggregateRule>,
}

impl CategoryRule {
    /// Bare-substring marker, `host` label, absent keys omitted.
    pub fn new(category: &'static str) -> Self {
        Self {
            category,
            marker: Marker::Contains(category),
            segment: "",
            base_labels: vec![BaseLabel::Host],
            missing: MissingPolicy::Omit,
            require_tag: None,
            keys: Vec::new(),
            aggregate: None,
        }
    }

    pub fn marker(mut self, marker: Marker) -> Self {
        self.marker = marker;
        self
    }

    pub fn segment(mut self, segment: &'static str) -> Self {
        self.segment = segment;
        self
    }

    pub fn without_host(mut self) -> Self {
        self.base_labels.retain(|label| *label != BaseLabel::Host);
        self
    }

    pub fn label(mut self, label: BaseLabel) -> Self {
        self.base_labels.push(label);
        self
    }

    pub fn missing(mut self, policy: MissingPolicy) -> Self {
        self.missing = policy;
        self
    }

    pub fn require_tag(mut self, tag: &'static str, value: &'static str) -> Self {
        self.require_tag = Some((tag, value));
        self
    }

    pub fn rule(mut self, rule: KeyRule) -> Self {
        self.keys.push(rule);
        self
    }

    pub fn aggregate(
        mut self,
        field: &'static str,
        labels: &'static [(&'static str, &'static str)],
    ) -> Self {
        self.aggregate = Some(AggregateRule { field, labels });
        self
    }

    pub fn accepts(&self, record: &SnapshotRecord) -> bool {
        if !self.marker.matches(record) {
            return false;
        }
        match self.require_tag {
            Some((tag, value)) => record.tag(tag) == Some(value),
            None => true,
        }
    }

    /// First matching key rule wins; unclaimed keys are scalars.
    pub fn classify(&self, key: &str) -> Classified<'_> {
        self.keys
            .iter()
            .find_map(|rule| rule.classify(key))
            .unwrap_or_else(|| Classified {
                derived: key.to_string(),
                shape: Shape::Scalar {
                    name: None,
                    help: None,
                },
            })
    }

    /// `cluster`, the base labels, then the aggregate entity labels.
    pub fn schema(&self) -> LabelSchema {
        let mut names = vec!["cluster"];
        names.extend(self.base_labels.iter().map(BaseLabel::name));
        if let Some(aggregate) = &self.aggregate {
            names.extend(aggregate.labels.iter().map(|(label, _)| *label));
        }
        LabelSchema::new(names)
    }
}

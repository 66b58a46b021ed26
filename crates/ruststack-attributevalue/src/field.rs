//! Record field resolution and the process-wide resolution cache.
//!
//! Resolution walks a record breadth first. Members of embedded records are
//! promoted into the outer record unless a shallower member already claims
//! their wire name. Two members claiming the same name at the same depth
//! cancel each other out, unless exactly one of them was named by an
//! annotation.
//!
//! Results are cached per (record type, tag key, case mode) for the lifetime
//! of the process. The cache is read-mostly: lookups take a shared lock and a
//! missing entry is built outside the lock, then published with
//! first-writer-wins semantics.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use tracing::debug;

use crate::reflect::RecordInfo;
use crate::tag::Tag;

/// A resolved record member.
#[derive(Debug, Clone)]
pub struct Field {
    /// Wire name.
    pub name: String,
    /// Path of field indexes from the outer record to the member.
    pub index: Vec<usize>,
    /// Parsed annotation of the member.
    pub tag: Tag,
    tagged: bool,
}

/// The resolved members of a record type.
#[derive(Debug)]
pub struct CachedFields {
    fields: Vec<Field>,
    by_name: HashMap<String, usize>,
    folded: Vec<String>,
    case_sensitive: bool,
}

impl CachedFields {
    fn new(fields: Vec<Field>, case_sensitive: bool) -> Self {
        let by_name = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.clone(), i))
            .collect();
        let folded = fields.iter().map(|f| fold_case(&f.name)).collect();
        Self {
            fields,
            by_name,
            folded,
            case_sensitive,
        }
    }

    /// Members in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Finds a member by wire name.
    ///
    /// An exact match wins; otherwise, unless the case sensitive mode is
    /// active, the first member whose name matches under simple case folding
    /// (see [`fold_case`]).
    #[must_use]
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        if let Some(&i) = self.by_name.get(name) {
            return self.fields.get(i);
        }
        if self.case_sensitive {
            return None;
        }
        let wanted = fold_case(name);
        self.folded
            .iter()
            .position(|f| *f == wanted)
            .and_then(|i| self.fields.get(i))
    }
}

/// Folds a name one character at a time so that every case variant of a
/// letter maps to the same text (`K`, `k` and the Kelvin sign; `σ`, `ς` and
/// `Σ`; `s` and `ſ`). Characters whose uppercase form expands to several
/// characters (`ß`) fold to that expansion.
fn fold_case(name: &str) -> String {
    name.chars()
        .flat_map(char::to_uppercase)
        .flat_map(char::to_lowercase)
        .collect()
}

type CacheKey = (TypeId, String, bool);

static FIELD_CACHE: LazyLock<RwLock<HashMap<CacheKey, Arc<CachedFields>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Returns the resolved members of a record type, building them on first use.
#[must_use]
pub fn cached_fields(
    info: &'static RecordInfo,
    tag_key: &str,
    case_sensitive: bool,
) -> Arc<CachedFields> {
    let key = ((info.type_id)(), tag_key.to_owned(), case_sensitive);
    if let Some(found) = FIELD_CACHE.read().get(&key) {
        return Arc::clone(found);
    }

    let built = Arc::new(CachedFields::new(
        resolve_fields(info, tag_key),
        case_sensitive,
    ));
    let mut cache = FIELD_CACHE.write();
    let entry = cache.entry(key).or_insert_with(|| {
        debug!(
            record = info.type_name,
            tag_key,
            case_sensitive,
            fields = built.fields.len(),
            "resolved record fields"
        );
        built
    });
    Arc::clone(entry)
}

struct Pending {
    info: &'static RecordInfo,
    index: Vec<usize>,
}

/// Computes the visible members of a record, without caching.
#[must_use]
pub fn resolve_fields(info: &'static RecordInfo, tag_key: &str) -> Vec<Field> {
    let mut next = vec![Pending {
        info,
        index: Vec::new(),
    }];
    let mut next_count: HashMap<TypeId, usize> = HashMap::new();
    let mut visited = HashSet::new();
    let mut fields: Vec<Field> = Vec::new();

    while !next.is_empty() {
        let current = std::mem::take(&mut next);
        let count = std::mem::take(&mut next_count);

        for pending in current {
            let id = (pending.info.type_id)();
            if !visited.insert(id) {
                continue;
            }
            let multiplicity = count.get(&id).copied().unwrap_or(1);

            for (i, member) in pending.info.fields.iter().enumerate() {
                let tag = Tag::for_field(member, tag_key);
                if tag.ignore {
                    continue;
                }
                let mut index = pending.index.clone();
                index.push(i);

                match member.embedded {
                    Some(embedded) if tag.name.is_none() => {
                        let inner = embedded();
                        let seen = next_count.entry((inner.type_id)()).or_insert(0);
                        *seen += 1;
                        if *seen == 1 {
                            next.push(Pending { info: inner, index });
                        }
                    }
                    _ => {
                        let tagged = tag.name.is_some();
                        let name = tag.name.clone().unwrap_or_else(|| member.name.to_owned());
                        let field = Field {
                            name,
                            index,
                            tag,
                            tagged,
                        };
                        // The same record reached twice at one depth yields
                        // duplicates that cancel out below.
                        if multiplicity > 1 {
                            fields.push(field.clone());
                        }
                        fields.push(field);
                    }
                }
            }
        }
    }

    fields.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then(a.index.len().cmp(&b.index.len()))
            .then(b.tagged.cmp(&a.tagged))
            .then(a.index.cmp(&b.index))
    });

    let mut resolved: Vec<Field> = fields
        .chunk_by(|a, b| a.name == b.name)
        .filter_map(dominant_field)
        .cloned()
        .collect();
    resolved.sort_by(|a, b| a.index.cmp(&b.index));
    resolved
}

/// Picks the winner of a group of members sharing a wire name, sorted by
/// depth then tagged first. `None` when the name is ambiguous.
fn dominant_field(group: &[Field]) -> Option<&Field> {
    let first = group.first()?;
    if let Some(second) = group.get(1) {
        if first.index.len() == second.index.len() && first.tagged == second.tagged {
            return None;
        }
    }
    Some(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::FieldInfo;

    struct Inner;
    struct Other;
    struct Outer;
    struct Tagged;
    struct Twice;

    static INNER: RecordInfo = RecordInfo {
        type_name: "Inner",
        type_id: TypeId::of::<Inner>,
        fields: &[
            FieldInfo {
                name: "shared",
                tags: &[],
                embedded: None,
            },
            FieldInfo {
                name: "inner_only",
                tags: &[],
                embedded: None,
            },
            FieldInfo {
                name: "clash",
                tags: &[],
                embedded: None,
            },
        ],
    };

    static OTHER: RecordInfo = RecordInfo {
        type_name: "Other",
        type_id: TypeId::of::<Other>,
        fields: &[
            FieldInfo {
                name: "clash",
                tags: &[],
                embedded: None,
            },
            FieldInfo {
                name: "skipped",
                tags: &[("dynamodbav", "-")],
                embedded: None,
            },
        ],
    };

    static OUTER: RecordInfo = RecordInfo {
        type_name: "Outer",
        type_id: TypeId::of::<Outer>,
        fields: &[
            FieldInfo {
                name: "shared",
                tags: &[],
                embedded: None,
            },
            FieldInfo {
                name: "inner",
                tags: &[],
                embedded: Some(inner_info),
            },
            FieldInfo {
                name: "other",
                tags: &[],
                embedded: Some(other_info),
            },
            FieldInfo {
                name: "Renamed",
                tags: &[("dynamodbav", "renamed_member,omitempty")],
                embedded: None,
            },
        ],
    };

    static TAGGED: RecordInfo = RecordInfo {
        type_name: "Tagged",
        type_id: TypeId::of::<Tagged>,
        fields: &[
            FieldInfo {
                name: "inner",
                tags: &[],
                embedded: Some(inner_info),
            },
            FieldInfo {
                name: "other",
                tags: &[("dynamodbav", "nested")],
                embedded: Some(other_info),
            },
            FieldInfo {
                name: "x",
                tags: &[("dynamodbav", "clash")],
                embedded: Some(other_info),
            },
        ],
    };

    static TWICE: RecordInfo = RecordInfo {
        type_name: "Twice",
        type_id: TypeId::of::<Twice>,
        fields: &[
            FieldInfo {
                name: "a",
                tags: &[],
                embedded: Some(inner_info),
            },
            FieldInfo {
                name: "b",
                tags: &[],
                embedded: Some(inner_info),
            },
        ],
    };

    fn inner_info() -> &'static RecordInfo {
        &INNER
    }

    fn other_info() -> &'static RecordInfo {
        &OTHER
    }

    fn names(fields: &[Field]) -> Vec<&str> {
        fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_should_promote_embedded_members() {
        let fields = resolve_fields(&OUTER, "dynamodbav");
        assert_eq!(
            names(&fields),
            vec!["shared", "inner_only", "renamed_member"]
        );
        assert_eq!(fields[0].index, vec![0]);
        assert_eq!(fields[1].index, vec![1, 1]);
        assert!(fields[2].tag.omit_empty);
    }

    #[test]
    fn test_should_drop_ambiguous_names_at_same_depth() {
        let fields = resolve_fields(&OUTER, "dynamodbav");
        assert!(!names(&fields).contains(&"clash"));
        assert!(!names(&fields).contains(&"skipped"));
    }

    #[test]
    fn test_should_prefer_tagged_member_and_keep_named_embeds() {
        let fields = resolve_fields(&TAGGED, "dynamodbav");
        let clash = fields.iter().find(|f| f.name == "clash").unwrap();
        assert_eq!(clash.index, vec![2]);
        let nested = fields.iter().find(|f| f.name == "nested").unwrap();
        assert_eq!(nested.index, vec![1]);
    }

    #[test]
    fn test_should_cancel_record_embedded_twice() {
        let fields = resolve_fields(&TWICE, "dynamodbav");
        assert!(fields.is_empty());
    }

    #[test]
    fn test_should_fall_back_to_case_insensitive_lookup() {
        let cached = cached_fields(&OUTER, "dynamodbav", false);
        assert_eq!(cached.field_by_name("SHARED").unwrap().index, vec![0]);
        assert_eq!(cached.field_by_name("shared").unwrap().index, vec![0]);

        let strict = cached_fields(&OUTER, "dynamodbav", true);
        assert!(strict.field_by_name("SHARED").is_none());
    }

    #[test]
    fn test_should_reuse_cached_entry() {
        let a = cached_fields(&INNER, "dynamodbav", false);
        let b = cached_fields(&INNER, "dynamodbav", false);
        assert!(Arc::ptr_eq(&a, &b));

        let json = cached_fields(&INNER, "json", false);
        assert!(!Arc::ptr_eq(&a, &json));
    }

    #[test]
    fn test_should_resolve_concurrently() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| cached_fields(&OTHER, "concurrent", false)))
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for r in &results {
            assert!(Arc::ptr_eq(r, &results[0]));
            assert_eq!(names(r.fields()), vec!["clash"]);
        }
    }

    #[test]
    fn test_should_fold_case_per_character() {
        assert_eq!(fold_case("Inner_Only"), "inner_only");
        assert_eq!(fold_case("\u{212A}ey"), fold_case("KEY"));
        assert_eq!(fold_case("\u{17F}ize"), fold_case("SIZE"));
        assert_eq!(fold_case("ΣΟΦΟΣ"), fold_case("σοφος"));
        assert_ne!("ΣΟΦΟΣ".to_lowercase(), "σοφοσ");
    }
}

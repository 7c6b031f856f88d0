//! Flat-file content catalog.
//!
//! The content store is a directory per entity, with one subdirectory per
//! category holding a `list.txt` of marker-delimited records:
//!
//! ```text
//! =START= {Название: Щи / shchi.png / 1700g} ===
//! Традиционный суп из капусты.
//! =END= {Щи} ===
//! ```
//!
//! The catalog is a pure view over the filesystem: no mutable state, no
//! caching. Absent directories and files read as empty, and a malformed
//! record is skipped with a warning rather than aborting the file.

use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// The five fixed content classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Cuisine,
    Costume,
    Info,
    Ornament,
    Events,
}

impl Category {
    /// Every category, in menu order.
    pub const ALL: [Category; 5] = [
        Category::Cuisine,
        Category::Costume,
        Category::Info,
        Category::Ornament,
        Category::Events,
    ];

    /// Subdirectory name inside an entity directory.
    pub fn dir_name(self) -> &'static str {
        match self {
            Category::Cuisine => "cuisine",
            Category::Costume => "costume",
            Category::Info => "info",
            Category::Ornament => "ornament",
            Category::Events => "events",
        }
    }

    /// Human-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Category::Cuisine => "Национальная кухня",
            Category::Costume => "Национальные костюмы",
            Category::Info => "Информация о народе",
            Category::Ornament => "Узоры и орнаменты",
            Category::Events => "События и люди",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One cultural artifact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    /// Image path relative to the item's category directory.
    pub image: String,
    /// Lightly normalized free-text date.
    pub date: String,
    pub description: String,
}

/// A flattened view of one item together with its owning entity and
/// category, plus its position in the per-category list (the positional
/// addressing scheme the button layer relies on).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub entity: String,
    pub category: Category,
    pub index: usize,
    pub item: Item,
}

/// Read-only view over the content store.
#[derive(Debug, Clone)]
pub struct Catalog {
    root: PathBuf,
}

const RECORD_START: &str = "=START=";
const RECORD_END: &str = "=END=";
const HEADER_FENCE: &str = "===";
const LIST_FILE: &str = "list.txt";

impl Catalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Entity ids, sorted lexicographically. Empty if the root is absent.
    pub fn entities(&self) -> Vec<String> {
        let mut out = Vec::new();
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(_) => return out,
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    out.push(name.to_string());
                }
            }
        }
        out.sort();
        out
    }

    /// Items of one (entity, category) pair. Absent file reads as empty.
    pub fn items(&self, entity: &str, category: Category) -> Vec<Item> {
        let path = self
            .root
            .join(entity)
            .join(category.dir_name())
            .join(LIST_FILE);
        if !path.exists() {
            return Vec::new();
        }
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("failed to read {}: {e}", path.display());
                return Vec::new();
            }
        };
        parse_records(&content)
    }

    /// Every item of every entity across all five categories.
    pub fn all_items(&self) -> Vec<CatalogEntry> {
        let mut out = Vec::new();
        for entity in self.entities() {
            for category in Category::ALL {
                for (index, item) in self.items(&entity, category).into_iter().enumerate() {
                    out.push(CatalogEntry {
                        entity: entity.clone(),
                        category,
                        index,
                        item,
                    });
                }
            }
        }
        out
    }

    /// The cuisine subset, used by the dish quiz.
    pub fn cuisine_items(&self) -> Vec<CatalogEntry> {
        let mut out = Vec::new();
        for entity in self.entities() {
            for (index, item) in self.items(&entity, Category::Cuisine).into_iter().enumerate() {
                out.push(CatalogEntry {
                    entity: entity.clone(),
                    category: Category::Cuisine,
                    index,
                    item,
                });
            }
        }
        out
    }

    /// Absolute path of an item's image inside the store.
    pub fn image_path(&self, entity: &str, category: Category, image: &str) -> PathBuf {
        self.root.join(entity).join(category.dir_name()).join(image)
    }
}

/// Expand the date shorthand used in content files: a trailing `gg` marks
/// a span of years, a trailing `g` a single year. Anything else passes
/// through, so already-expanded dates are left alone.
pub fn normalize_date(raw: &str) -> String {
    if let Some(stem) = raw.strip_suffix("gg") {
        format!("{} гг", stem.trim_end())
    } else if let Some(stem) = raw.strip_suffix('g') {
        format!("{} год", stem.trim_end())
    } else {
        raw.to_string()
    }
}

fn parse_records(content: &str) -> Vec<Item> {
    let mut items = Vec::new();
    let mut cursor = 0;
    while let Some(found) = content[cursor..].find(RECORD_START) {
        let after_start = cursor + found + RECORD_START.len();
        let (header, after_header) = match read_braced(content, after_start) {
            Some(parts) => parts,
            None => {
                warn!("unterminated record header, skipping rest of file");
                break;
            }
        };
        let fence = match content[after_header..].find(HEADER_FENCE) {
            Some(pos) => pos,
            None => {
                warn!("record header missing fence, skipping rest of file");
                break;
            }
        };
        let body_start = after_header + fence + HEADER_FENCE.len();
        let body_len = match content[body_start..].find(RECORD_END) {
            Some(pos) => pos,
            None => {
                warn!("unterminated record body, skipping rest of file");
                break;
            }
        };
        let body = content[body_start..body_start + body_len].trim();
        cursor = body_start + body_len + RECORD_END.len();

        match parse_header(header) {
            Some((name, image, date)) => items.push(Item {
                name,
                image,
                date: normalize_date(&date),
                description: body.to_string(),
            }),
            None => warn!("skipping record with malformed header: {{{header}}}"),
        }
    }
    items
}

/// Read a `{...}` group starting at or after `from`, returning its inner
/// text and the index just past the closing brace.
fn read_braced(content: &str, from: usize) -> Option<(&str, usize)> {
    let rest = &content[from..];
    let open = from + rest.find('{')?;
    let close = open + content[open..].find('}')?;
    Some((&content[open + 1..close], close + 1))
}

/// Header fields are `name / image / date`, separated by `/`. The name
/// field may carry a `label:` prefix which is stripped. Fewer than three
/// fields means the record is malformed.
fn parse_header(header: &str) -> Option<(String, String, String)> {
    let mut parts = header.split('/');
    let name_part = parts.next()?.trim();
    let image = parts.next()?.trim();
    let date = parts.next()?.trim();

    let name = match name_part.split_once(':') {
        Some((_, value)) => value.trim(),
        None => name_part,
    };

    Some((name.to_string(), image.to_string(), date.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_list(root: &Path, entity: &str, category: Category, content: &str) {
        let dir = root.join(entity).join(category.dir_name());
        fs::create_dir_all(&dir).expect("create category dir");
        fs::write(dir.join(LIST_FILE), content).expect("write list file");
    }

    const WELL_FORMED: &str = "\
=START= {Название: Щи / shchi.png / 1700g} ===
Традиционный суп из капусты.
=END= {Щи} ===
";

    #[test]
    fn test_parse_single_record() {
        let items = parse_records(WELL_FORMED);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Щи");
        assert_eq!(items[0].image, "shchi.png");
        assert_eq!(items[0].date, "1700 год");
        assert_eq!(items[0].description, "Традиционный суп из капусты.");
    }

    #[test]
    fn test_parse_header_without_label_prefix() {
        let items = parse_records(
            "=START= {Каша / kasha.png / 1800} ===\nГречневая каша.\n=END= {Каша} ===\n",
        );
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Каша");
        assert_eq!(items[0].date, "1800");
    }

    #[test]
    fn test_malformed_record_is_skipped() {
        let content = format!(
            "=START= {{Без полей}} ===\nнет заголовка\n=END= {{x}} ===\n{WELL_FORMED}"
        );
        let items = parse_records(&content);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Щи");
    }

    #[test]
    fn test_unterminated_record_does_not_panic() {
        let items = parse_records("=START= {a/b/c} ===\nникогда не закрыт");
        assert!(items.is_empty());
    }

    #[test]
    fn test_normalize_date_year() {
        assert_eq!(normalize_date("1700g"), "1700 год");
    }

    #[test]
    fn test_normalize_date_year_span() {
        assert_eq!(normalize_date("1700-1800gg"), "1700-1800 гг");
    }

    #[test]
    fn test_normalize_date_passthrough_is_idempotent() {
        assert_eq!(normalize_date("1700 год"), "1700 год");
        assert_eq!(normalize_date("12.06.1990"), "12.06.1990");
        let expanded = normalize_date("1700g");
        assert_eq!(normalize_date(&expanded), expanded);
    }

    #[test]
    fn test_entities_sorted() {
        let tmp = TempDir::new().expect("temp dir");
        for entity in ["yakut", "even", "russian"] {
            fs::create_dir_all(tmp.path().join(entity)).expect("entity dir");
        }
        let catalog = Catalog::new(tmp.path());
        assert_eq!(catalog.entities(), vec!["even", "russian", "yakut"]);
    }

    #[test]
    fn test_missing_root_reads_empty() {
        let catalog = Catalog::new("/nonexistent/ethno-data");
        assert!(catalog.entities().is_empty());
        assert!(catalog.items("russian", Category::Cuisine).is_empty());
        assert!(catalog.all_items().is_empty());
    }

    #[test]
    fn test_all_items_flattens_with_indices() {
        let tmp = TempDir::new().expect("temp dir");
        write_list(
            tmp.path(),
            "russian",
            Category::Cuisine,
            &format!(
                "{WELL_FORMED}=START= {{Каша / kasha.png / 1800}} ===\nКаша.\n=END= {{Каша}} ===\n"
            ),
        );
        write_list(
            tmp.path(),
            "yakut",
            Category::Events,
            "=START= {Ысыах / ysyakh.png / 21.06} ===\nПраздник лета.\n=END= {Ысыах} ===\n",
        );

        let catalog = Catalog::new(tmp.path());
        let all = catalog.all_items();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].entity, "russian");
        assert_eq!(all[0].index, 0);
        assert_eq!(all[1].index, 1);
        assert_eq!(all[1].item.name, "Каша");
        assert_eq!(all[2].category, Category::Events);

        let cuisine = catalog.cuisine_items();
        assert_eq!(cuisine.len(), 2);
        assert!(cuisine.iter().all(|e| e.category == Category::Cuisine));
    }
}

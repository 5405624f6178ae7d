//! Botanical taxonomy table and taxonomic tree builder
//!
//! Maps the classifier's class ids to fixed taxonomic records and derives the
//! family → genera/species grouping returned with every identification.
//!
//! The table is immutable once built and is shared by reference; tests build
//! small fixture tables with [`TaxonomyTable::from_records`].

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Number of classes in the built-in table (and in the classifier output)
pub const NUM_CLASSES: usize = 67;

/// Built-in table rows, indexed by class id: (common name, family, genus, latin name)
const BUILTIN_RECORDS: [(&str, &str, &str, &str); NUM_CLASSES] = [
    ("凤凰木", "豆科", "凤凰木属", "Delonix regia"),
    ("刺槐", "豆科", "刺槐属", "Robinia pseudoacacia"),
    ("合欢", "豆科", "合欢属", "Albizia julibrissin"),
    ("含羞草", "豆科", "含羞草属", "Mimosa pudica"),
    ("四棱豆", "豆科", "四棱豆属", "Securigera varia"),
    ("国槐", "豆科", "槐属", "Sophora japonica"),
    ("多头向日葵", "豆科", "向日葵属", "Helianthus multiflorus"),
    ("多花木兰", "木兰科", "木兰属", "Magnolia multiflora"),
    ("大叶相思", "豆科", "相思属", "Acacia mangium"),
    ("大叶莴苣", "菊科", "莴苣属", "Lactuca sativa var. angustana"),
    ("大叶菊苣", "菊科", "菊苣属", "Cichorium intybus"),
    ("大皂角", "豆科", "皂荚属", "Gleditsia sinensis"),
    ("孔雀豆", "豆科", "豆属", "Cyamopsis tetragonoloba"),
    ("小丽花", "菊科", "丽花属", "Tagetes patula"),
    ("小冠花", "豆科", "冠花属", "Stylosanthes guianensis"),
    ("小扁豆", "豆科", "扁豆属", "Vigna unguiculata"),
    ("巨紫荆", "豆科", "紫荆属", "Bauhinia gigantea"),
    ("巴山豆", "豆科", "豆属", "Sophora tonkinensis"),
    ("幸运草", "豆科", "苜蓿属", "Trifolium repens"),
    ("扁豆", "豆科", "扁豆属", "Lablab purpureus"),
    ("拉巴豆", "豆科", "豆属", "Lathyrus sativus"),
    ("斑马豆", "豆科", "豆属", "Phaseolus coccineus"),
    ("木耳菜", "苋科", "木耳菜属", "Basella alba"),
    ("木豆", "豆科", "木豆属", "Cajanus cajan"),
    ("柠条", "豆科", "柠条属", "Caragana microphylla"),
    ("榼藤子", "豆科", "藤属", "Vigna vexillata"),
    ("油麻藤", "豆科", "油麻藤属", "Clitoria ternatea"),
    ("洋金凤", "豆科", "金凤花属", "Caesalpinia pulcherrima"),
    ("海红豆", "豆科", "海红豆属", "Abrus precatorius"),
    ("甘草", "豆科", "甘草属", "Glycyrrhiza uralensis"),
    ("白三叶", "豆科", "苜蓿属", "Trifolium repens"),
    ("白刀豆", "豆科", "刀豆属", "Canavalia gladiata"),
    ("白扁豆", "豆科", "扁豆属", "Lablab purpureus"),
    ("眉豆", "豆科", "眉豆属", "Vigna angularis"),
    ("秋英", "菊科", "秋英属", "Aster tataricus"),
    ("竹豆", "豆科", "豆属", "Canavalia ensiformis"),
    ("紫云英", "豆科", "苜蓿属", "Astragalus sinicus"),
    ("紫穗槐", "豆科", "槐属", "Sesbania cannabina"),
    ("紫色向日葵", "菊科", "向日葵属", "Helianthus annuus var. purple"),
    ("紫藤", "豆科", "紫藤属", "Wisteria sinensis"),
    ("红豆草", "豆科", "红豆草属", "Aeschynomene indica"),
    ("绿苑子", "豆科", "苑子属", "Medicago sativa"),
    ("羽扇豆", "豆科", "羽扇豆属", "Lupinus polyphyllus"),
    ("翠菊", "菊科", "翠菊属", "Chrysanthemum coronarium"),
    ("芦巴子", "豆科", "芦巴属", "Trigonella foenum-graecum"),
    ("花环菊", "菊科", "菊属", "Chrysanthemum morifolium"),
    ("花芸豆", "豆科", "芸豆属", "Phaseolus vulgaris"),
    ("苜蓿", "豆科", "苜蓿属", "Medicago sativa"),
    ("苦豆子", "豆科", "苦豆属", "Tephrosia vogelii"),
    ("草木樨", "豆科", "草木樨属", "Lespedeza bicolor"),
    ("荷包豆", "豆科", "荷包豆属", "Erythrina variegata"),
    ("莴苣", "菊科", "莴苣属", "Lactuca sativa"),
    ("蚕豆", "豆科", "蚕豆属", "Vicia faba"),
    ("补骨脂", "豆科", "补骨脂属", "Psoralea corylifolia"),
    ("豆薯", "豆科", "豆薯属", "Pachyrhizus erosus"),
    ("豇豆", "豆科", "豇豆属", "Vigna unguiculata"),
    ("豌豆", "豆科", "豌豆属", "Pisum sativum"),
    ("鄂西红豆", "豆科", "红豆属", "Abrus pulchellus"),
    ("金丝豆", "豆科", "金丝豆属", "Clitoria ternatea"),
    ("金合欢", "豆科", "相思属", "Acacia dealbata"),
    ("银合欢", "豆科", "合欢属", "Leucaena leucocephala"),
    ("音符豆", "豆科", "豆属", "Phaseolus lunatus"),
    ("骆驼刺", "豆科", "骆驼刺属", "Alhagi sparsifolia"),
    ("鸡冠刺桐", "豆科", "刺桐属", "Erythrina crista-galli"),
    ("麻豌豆", "豆科", "豌豆属", "Pisum sativum var. arvense"),
    ("黄花梨", "豆科", "黄花梨属", "Dalbergia odorifera"),
    ("黄花槐", "豆科", "槐属", "Sophora flavescens"),
];

/// Taxonomic record for one class id
///
/// Serialized with the botanical field names used by the web UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxonomicRecord {
    /// Common (Chinese) name
    #[serde(rename = "中文名")]
    pub common_name: String,

    /// Family (科)
    #[serde(rename = "科", skip_serializing_if = "String::is_empty")]
    pub family: String,

    /// Genus (属)
    #[serde(rename = "属", skip_serializing_if = "String::is_empty")]
    pub genus: String,

    /// Latin binomial
    #[serde(rename = "拉丁名", skip_serializing_if = "String::is_empty")]
    pub latin_name: String,
}

impl TaxonomicRecord {
    pub fn new(
        common_name: impl Into<String>,
        family: impl Into<String>,
        genus: impl Into<String>,
        latin_name: impl Into<String>,
    ) -> Self {
        Self {
            common_name: common_name.into(),
            family: family.into(),
            genus: genus.into(),
            latin_name: latin_name.into(),
        }
    }

    /// Placeholder for a class id the table does not know
    ///
    /// Only the common name is set (`未知(<id>)`); the other fields are empty
    /// and omitted from JSON.
    pub fn unknown(class_id: usize) -> Self {
        Self {
            common_name: format!("未知({})", class_id),
            family: String::new(),
            genus: String::new(),
            latin_name: String::new(),
        }
    }

    /// Whether this record is the unknown-id placeholder
    pub fn is_placeholder(&self) -> bool {
        self.family.is_empty() && self.genus.is_empty() && self.latin_name.is_empty()
    }
}

/// Derived family grouping for the top prediction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxonomicTree {
    #[serde(rename = "科")]
    pub family: String,

    /// Distinct genera in the family
    #[serde(rename = "属")]
    pub genera: BTreeSet<String>,

    /// Common names of every record in the family, in table order
    #[serde(rename = "种")]
    pub species: Vec<String>,
}

/// Immutable class id → record table
#[derive(Debug, Clone)]
pub struct TaxonomyTable {
    records: BTreeMap<usize, TaxonomicRecord>,
}

impl TaxonomyTable {
    /// The built-in 67-class botanical table
    pub fn builtin() -> Self {
        Self::from_records(BUILTIN_RECORDS.iter().enumerate().map(
            |(class_id, (common_name, family, genus, latin_name))| {
                (
                    class_id,
                    TaxonomicRecord::new(*common_name, *family, *genus, *latin_name),
                )
            },
        ))
    }

    /// Build a table from (class id, record) pairs
    ///
    /// A repeated class id keeps the last record.
    pub fn from_records(records: impl IntoIterator<Item = (usize, TaxonomicRecord)>) -> Self {
        Self {
            records: records.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record for a class id, if the table has one
    pub fn get(&self, class_id: usize) -> Option<&TaxonomicRecord> {
        self.records.get(&class_id)
    }

    /// Total lookup: unknown ids yield the `未知(<id>)` placeholder
    pub fn lookup(&self, class_id: usize) -> TaxonomicRecord {
        self.get(class_id)
            .cloned()
            .unwrap_or_else(|| TaxonomicRecord::unknown(class_id))
    }

    /// Records in class id order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &TaxonomicRecord)> {
        self.records.iter().map(|(id, record)| (*id, record))
    }

    /// Group every record of `family` (exact, case-sensitive match)
    ///
    /// An unmatched family yields empty genera and species.
    pub fn build_tree(&self, family: &str) -> TaxonomicTree {
        TaxonomicTree {
            family: family.to_string(),
            genera: self.family_members(family).map(|r| r.genus.clone()).collect(),
            species: self
                .family_members(family)
                .map(|r| r.common_name.clone())
                .collect(),
        }
    }

    fn family_members<'a>(
        &'a self,
        family: &'a str,
    ) -> impl Iterator<Item = &'a TaxonomicRecord> + 'a {
        self.records.values().filter(move |r| r.family == family)
    }
}

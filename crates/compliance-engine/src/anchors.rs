//! Anchor state threaded through one analysis run
//!
//! Each check that locates a landmark records its paragraph index here so
//! later checks can search relative to it. Keys form a closed set; their
//! snake_case names are what the rule book uses in `after:` / `before:`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorKey {
    // Cover page
    CoverHeader,
    CoverUniversity,
    CoverInstitute,
    CoverDepartment,
    CoverTitle,
    CoverTitleEnd,
    CoverStudent,
    CoverThesisType,
    CoverDate,
    CoverCity,

    // Approval page
    ApprovalHeading,
    ApprovalTitle,
    ApprovalTitleEnd,
    ApprovalStatement,
    ApprovalAuthorityBlock,
    ApprovalCopyright,

    // Ethics statement
    EthicsHeading,
    EthicsBody,

    // Turkish abstract
    AbstractTrHeading,
    AbstractTrTitle,
    AbstractTrTitleEnd,
    AbstractTrAuthor,
    AbstractTrProgram,
    AbstractTrProgramEnd,
    AbstractTrDate,
    AbstractTrPageCount,
    AbstractTrBody,
    AbstractTrKeywords,

    // English abstract
    AbstractEnHeading,
    AbstractEnTitle,
    AbstractEnTitleEnd,
    AbstractEnAuthor,
    AbstractEnProgram,
    AbstractEnProgramEnd,
    AbstractEnDate,
    AbstractEnPageCount,
    AbstractEnBody,
    AbstractEnKeywords,

    // Front lists
    AcknowledgementsHeading,
    TocHeading,
    TocPageLabel,
    TablesListHeading,
    FiguresListHeading,
    AbbreviationsHeading,

    // Body
    FirstChapter,
    LastChapterTitle,

    // Back matter
    ReferencesHeading,
    AppendicesHeading,
    CvHeading,
}

impl AnchorKey {
    /// Turkish description used in "not found" explanations
    pub fn label(&self) -> &'static str {
        use AnchorKey::*;
        match self {
            CoverHeader => "Kapak başlığı (T.C.)",
            CoverUniversity => "Üniversite adı",
            CoverInstitute => "Enstitü adı",
            CoverDepartment => "Anabilim dalı satırı",
            CoverTitle | CoverTitleEnd => "Kapaktaki tez başlığı",
            CoverStudent => "Öğrenci adı",
            CoverThesisType => "Tez türü satırı",
            CoverDate => "Tarih satırı",
            CoverCity => "Şehir satırı",
            ApprovalHeading => "Onay sayfası başlığı",
            ApprovalTitle | ApprovalTitleEnd => "Onay sayfasındaki tez başlığı",
            ApprovalStatement => "Onay ifadesi",
            ApprovalAuthorityBlock => "Enstitü müdürü onay bloğu",
            ApprovalCopyright => "Telif hakkı notu",
            EthicsHeading => "Etik beyan başlığı",
            EthicsBody => "Etik beyan metni",
            AbstractTrHeading => "ÖZET başlığı",
            AbstractTrTitle | AbstractTrTitleEnd => "Özetteki tez başlığı",
            AbstractTrAuthor => "Özetteki yazar adı",
            AbstractTrProgram | AbstractTrProgramEnd => "Özetteki program/danışman bilgisi",
            AbstractTrDate => "Özetteki tarih satırı",
            AbstractTrPageCount => "Özetteki sayfa sayısı satırı",
            AbstractTrBody => "Özet metni",
            AbstractTrKeywords => "Anahtar Kelimeler satırı",
            AbstractEnHeading => "ABSTRACT başlığı",
            AbstractEnTitle | AbstractEnTitleEnd => "Abstract tez başlığı",
            AbstractEnAuthor => "Abstract yazar adı",
            AbstractEnProgram | AbstractEnProgramEnd => "Abstract program/danışman bilgisi",
            AbstractEnDate => "Abstract tarih satırı",
            AbstractEnPageCount => "Abstract sayfa sayısı satırı",
            AbstractEnBody => "Abstract metni",
            AbstractEnKeywords => "Keywords satırı",
            AcknowledgementsHeading => "Teşekkür başlığı",
            TocHeading => "İÇİNDEKİLER başlığı",
            TocPageLabel => "İçindekiler 'Sayfa' etiketi",
            TablesListHeading => "TABLOLAR LİSTESİ başlığı",
            FiguresListHeading => "ŞEKİLLER LİSTESİ başlığı",
            AbbreviationsHeading => "Simgeler ve kısaltmalar başlığı",
            FirstChapter => "İlk bölüm başlığı",
            LastChapterTitle => "Son bölüm başlığı",
            ReferencesHeading => "KAYNAKLAR başlığı",
            AppendicesHeading => "EKLER başlığı",
            CvHeading => "ÖZGEÇMİŞ başlığı",
        }
    }
}

/// A chapter's number line and the title line right after it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterBlock {
    pub number: u32,
    pub number_index: usize,
    pub title_index: usize,
}

/// Landmarks found so far in the current document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnchorState {
    indices: BTreeMap<AnchorKey, usize>,
    pub thesis_title: Option<String>,
    pub student_name: Option<String>,
    pub chapters: Option<Vec<ChapterBlock>>,
}

impl AnchorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: AnchorKey) -> Option<usize> {
        self.indices.get(&key).copied()
    }

    pub fn set(&mut self, key: AnchorKey, index: usize) {
        self.indices.insert(key, index);
    }

    pub fn contains(&self, key: AnchorKey) -> bool {
        self.indices.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Chapter whose scope contains `index`
    pub fn chapter_of(&self, index: usize) -> Option<&ChapterBlock> {
        self.chapters
            .as_deref()?
            .iter()
            .rev()
            .find(|c| c.number_index <= index)
    }
}

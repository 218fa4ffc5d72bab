//! Check procedures and the tag registry the dispatcher uses

pub(crate) mod primitives;

mod abstracts;
mod approval;
mod body;
mod cover;
mod ethics;
mod front_lists;
mod generic;
mod global;
mod references;

use shared_types::CheckResult;
use tracing::warn;

use crate::context::CheckContext;
use crate::error::CheckError;
use crate::rules::Rule;

/// Signature shared by every check procedure
pub type CheckFn = fn(&mut CheckContext<'_>, &Rule) -> Result<CheckResult, CheckError>;

/// Every tag the dispatcher understands, in pipeline order
pub const CHECK_TAGS: &[&str] = &[
    "required_heading",
    "page_margins",
    "paper_size",
    "document_font",
    "blank_run",
    "section_heading",
    "cover_header",
    "cover_university",
    "cover_institute",
    "cover_department",
    "cover_title",
    "cover_student",
    "cover_thesis_type",
    "cover_date",
    "cover_city",
    "approval_heading",
    "approval_title",
    "approval_statement",
    "approval_authority_block",
    "approval_authority_gap",
    "approval_copyright",
    "ethics_heading",
    "ethics_body",
    "ethics_ai_disclosure",
    "abstract_heading",
    "abstract_title",
    "abstract_author",
    "abstract_program",
    "abstract_date",
    "abstract_page_count",
    "abstract_body",
    "abstract_keywords",
    "acknowledgements_heading",
    "acknowledgements_body",
    "toc_heading",
    "toc_page_label",
    "toc_entries",
    "tables_list_heading",
    "figures_list_heading",
    "list_page_label",
    "list_entries",
    "abbreviations_heading",
    "abbreviations_entries",
    "chapter_headings",
    "chapter_titles",
    "chapter_spacing",
    "subheading_format",
    "subheading_numbering",
    "figure_captions",
    "figure_numbering",
    "table_captions",
    "table_numbering",
    "body_paragraphs",
    "list_items",
    "references_heading",
    "references_entries",
    "appendices_heading",
    "cv_heading",
];

/// Check procedure registered under `tag`
pub fn lookup(tag: &str) -> Option<CheckFn> {
    let check: CheckFn = match tag {
        "required_heading" => generic::required_heading,
        "page_margins" => global::page_margins,
        "paper_size" => global::paper_size,
        "document_font" => global::document_font,
        "blank_run" => generic::blank_run,
        "section_heading" => generic::section_heading,

        "cover_header" => cover::cover_header,
        "cover_university" => cover::cover_university,
        "cover_institute" => cover::cover_institute,
        "cover_department" => cover::cover_department,
        "cover_title" => cover::cover_title,
        "cover_student" => cover::cover_student,
        "cover_thesis_type" => cover::cover_thesis_type,
        "cover_date" => cover::cover_date,
        "cover_city" => cover::cover_city,

        "approval_heading" => approval::approval_heading,
        "approval_title" => approval::approval_title,
        "approval_statement" => approval::approval_statement,
        "approval_authority_block" => approval::approval_authority_block,
        "approval_authority_gap" => approval::approval_authority_gap,
        "approval_copyright" => approval::approval_copyright,

        "ethics_heading" => ethics::ethics_heading,
        "ethics_body" => ethics::ethics_body,
        "ethics_ai_disclosure" => ethics::ethics_ai_disclosure,

        "abstract_heading" => abstracts::abstract_heading,
        "abstract_title" => abstracts::abstract_title,
        "abstract_author" => abstracts::abstract_author,
        "abstract_program" => abstracts::abstract_program,
        "abstract_date" => abstracts::abstract_date,
        "abstract_page_count" => abstracts::abstract_page_count,
        "abstract_body" => abstracts::abstract_body,
        "abstract_keywords" => abstracts::abstract_keywords,

        "acknowledgements_heading" => front_lists::acknowledgements_heading,
        "acknowledgements_body" => front_lists::acknowledgements_body,
        "toc_heading" => front_lists::toc_heading,
        "toc_page_label" => front_lists::toc_page_label,
        "toc_entries" => front_lists::toc_entries,
        "tables_list_heading" => front_lists::tables_list_heading,
        "figures_list_heading" => front_lists::figures_list_heading,
        "list_page_label" => front_lists::list_page_label,
        "list_entries" => front_lists::list_entries,
        "abbreviations_heading" => front_lists::abbreviations_heading,
        "abbreviations_entries" => front_lists::abbreviations_entries,

        "chapter_headings" => body::chapters::chapter_headings,
        "chapter_titles" => body::chapters::chapter_titles,
        "chapter_spacing" => body::chapters::chapter_spacing,
        "subheading_format" => body::headings::subheading_format,
        "subheading_numbering" => body::headings::subheading_numbering,
        "figure_captions" => body::figures::figure_captions,
        "figure_numbering" => body::figures::figure_numbering,
        "table_captions" => body::tables::table_captions,
        "table_numbering" => body::tables::table_numbering,
        "body_paragraphs" => body::paragraphs::body_paragraphs,
        "list_items" => body::lists::list_items,

        "references_heading" => references::references_heading,
        "references_entries" => references::references_entries,
        "appendices_heading" => references::appendices_heading,
        "cv_heading" => references::cv_heading,

        _ => return None,
    };
    Some(check)
}

pub fn is_known(tag: &str) -> bool {
    lookup(tag).is_some()
}

/// Run one rule. Never fails: an unknown tag or a check error becomes a
/// failing result so the remaining rules still run.
pub fn run(ctx: &mut CheckContext<'_>, rule: &Rule) -> CheckResult {
    let Some(check) = lookup(&rule.check) else {
        warn!(check = %rule.check, title = %rule.title, "unknown check tag");
        return CheckResult::fail(
            &rule.title,
            None,
            format!("Bilinmeyen kontrol türü: {}", rule.check),
        );
    };

    match check(ctx, rule) {
        Ok(result) => result,
        Err(err) => {
            warn!(check = %rule.check, title = %rule.title, error = %err, "check failed");
            CheckResult::fail(&rule.title, None, format!("Kontrol çalıştırılamadı: {}", err))
        }
    }
}

use crate::commands::CmdMessage;
use crate::query::{PageRequest, Pagination};

/// Messages describing where a paginated result landed.
///
/// An empty result gets an explicit "no results" line. A page request past the
/// end gets a warning naming the page actually shown.
pub fn pagination_messages(requested: PageRequest, pagination: &Pagination, noun: &str) -> Vec<CmdMessage> {
    let mut messages = Vec::new();

    if pagination.total == 0 {
        messages.push(CmdMessage::info(format!("No {} found.", noun)));
        return messages;
    }

    if requested.page() != pagination.page {
        messages.push(CmdMessage::warning(format!(
            "Page {} is out of range, showing page {} of {}",
            requested.page(),
            pagination.page,
            pagination.total_pages
        )));
    }

    messages.push(CmdMessage::info(format!(
        "Page {} of {} ({} {})",
        pagination.page,
        pagination.total_pages,
        pagination.total,
        if pagination.total == 1 {
            singular(noun)
        } else {
            noun.to_string()
        }
    )));
    messages
}

fn singular(noun: &str) -> String {
    match noun.strip_suffix("ies") {
        Some(stem) => format!("{}y", stem),
        None => noun.trim_end_matches('s').to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;

    #[test]
    fn empty_result_says_so() {
        let request = PageRequest::default();
        let p = Pagination::compute(request, 0);
        let msgs = pagination_messages(request, &p, "documents");
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].content, "No documents found.");
    }

    #[test]
    fn clamped_page_warns() {
        let request = PageRequest::new(7, 10).unwrap();
        let p = Pagination::compute(request, 15);
        let msgs = pagination_messages(request, &p, "documents");
        assert_eq!(msgs[0].level, MessageLevel::Warning);
        assert!(msgs[0].content.contains("showing page 2 of 2"));
        assert_eq!(msgs[1].content, "Page 2 of 2 (15 documents)");
    }

    #[test]
    fn singular_noun_for_one_result() {
        let request = PageRequest::default();
        let p = Pagination::compute(request, 1);
        let msgs = pagination_messages(request, &p, "documents");
        assert_eq!(msgs[0].content, "Page 1 of 1 (1 document)");

        let msgs = pagination_messages(request, &p, "entries");
        assert_eq!(msgs[0].content, "Page 1 of 1 (1 entry)");
    }
}

//! crates/pitchdeck_core/src/prompt.rs
//!
//! Builds the messages sent to the assistant thread. Pure string assembly so
//! it can be unit tested without any network dependency.

use crate::catalog::SlideType;
use crate::domain::Language;

/// Builds the generation message for one slide, combining the catalog brief
/// with the concatenated company document text.
pub fn slide_prompt(slide_type: SlideType, language: Language, doc_content: &str) -> String {
    let spec = slide_type.spec();
    let name = slide_type.display_name(language);
    let elements = spec.required_elements.join(", ");

    match language {
        Language::English => format!(
            "Write the text for the \"{name}\" slide of an investor pitch deck.\n\
             \n\
             Brief: {brief}\n\
             Cover these elements: {elements}.\n\
             \n\
             Rules: respond with the slide text only, as short bullet points \
             (a single paragraph for the Introduction slide), at least three \
             points, no headings, no commentary.\n\
             \n\
             Company documents:\n\
             {doc_content}",
            name = name,
            brief = spec.brief,
            elements = elements,
            doc_content = doc_content,
        ),
        Language::Norwegian => format!(
            "Svar p\u{e5} norsk. Skriv teksten til lysbildet \"{name}\" i en \
             investorpresentasjon.\n\
             \n\
             Oppgave: {brief}\n\
             Dekk disse elementene: {elements}.\n\
             \n\
             Regler: svar kun med lysbildeteksten, som korte punkter (ett \
             avsnitt for introduksjonslysbildet), minst tre punkter, ingen \
             overskrifter, ingen kommentarer.\n\
             \n\
             Selskapsdokumenter:\n\
             {doc_content}",
            name = name,
            brief = spec.brief,
            elements = elements,
            doc_content = doc_content,
        ),
    }
}

/// Builds the message asking the assistant to revise an existing slide.
pub fn edit_prompt(current_content: &str, instructions: &str, language: Language) -> String {
    match language {
        Language::English => format!(
            "Revise this slide according to the edit request. Keep the same \
             format and structure; respond with the revised slide text only.\n\
             \n\
             Current content:\n\
             {current_content}\n\
             \n\
             Edit request:\n\
             {instructions}",
        ),
        Language::Norwegian => format!(
            "Svar p\u{e5} norsk. Revider dette lysbildet i henhold til \
             redigeringsforesp\u{f8}rselen. Behold samme format og struktur; \
             svar kun med den reviderte lysbildeteksten.\n\
             \n\
             N\u{e5}v\u{e6}rende innhold:\n\
             {current_content}\n\
             \n\
             Redigeringsforesp\u{f8}rsel:\n\
             {instructions}",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slide_prompt_includes_name_elements_and_documents() {
        let prompt = slide_prompt(
            SlideType::Problem,
            Language::English,
            "Acme sells rockets.",
        );
        assert!(prompt.contains("Problem Statement"));
        assert!(prompt.contains("problem_statement, market_impact, solution_need"));
        assert!(prompt.contains("Acme sells rockets."));
    }

    #[test]
    fn norwegian_prompt_uses_norwegian_name() {
        let prompt = slide_prompt(SlideType::Solution, Language::Norwegian, "docs");
        assert!(prompt.starts_with("Svar p\u{e5} norsk."));
        assert!(prompt.contains("L\u{f8}sning"));
    }

    #[test]
    fn edit_prompt_carries_current_content_and_request() {
        let prompt = edit_prompt("old bullets", "make it shorter", Language::English);
        assert!(prompt.contains("old bullets"));
        assert!(prompt.contains("make it shorter"));
    }
}

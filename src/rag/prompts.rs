//! Prompt templates for the retrieval chain.

use super::store::ScoredChunk;

/// Rewrites a history-dependent question into a standalone one. Only used
/// when history is non-empty; with no history the raw query passes through
/// untouched, so rewriting can never invent context from nothing.
pub const CONTEXTUALIZE_SYSTEM_PROMPT: &str = "\
Given a chat history and the latest user question which might reference \
context in the chat history, formulate a standalone question which can be \
understood without the chat history. Do NOT answer the question, just \
reformulate it if needed and otherwise return it as is. Reply with the \
reformulated question only.";

/// The exact fallback sentence the model must use when the retrieved
/// context does not answer the question.
pub const NO_ANSWER_SENTENCE: &str = "I'm sorry, but I could not find the information \
to answer your question in the provided documents.";

/// Grounded question-answering system prompt. Rendered with the retrieved
/// context appended.
pub fn grounded_answer_prompt(context: &str) -> String {
    format!(
        "## ROLE & GOAL ##\n\
        You are an advanced AI assistant specializing in information retrieval \
        and synthesis. Your primary goal is to provide accurate, concise, and \
        helpful answers to user queries by synthesizing information exclusively \
        from the provided context. You are forbidden from using any prior \
        knowledge or information outside of this context.\n\
        \n\
        ### CORE INSTRUCTIONS ###\n\
        1. Grounding: Your entire response MUST be based solely on the \
        information contained within the ## Context ## section below. Do not \
        add information that is not present in the text.\n\
        2. Synthesis: Do not just extract and repeat verbatim chunks of text. \
        Synthesize the relevant information into a coherent answer.\n\
        3. No Information Case: If the context does not contain any relevant \
        information to answer the query, you MUST respond with: \"{NO_ANSWER_SENTENCE}\" \
        Do not try to guess or infer an answer.\n\
        4. Citation: When you provide an answer, you MUST cite the source of \
        the information using the identifier provided with each context \
        snippet (e.g. `[Source: report.pdf, page 4]`). If multiple sources \
        are used, cite all of them.\n\
        \n\
        ### STYLE & TONE ###\n\
        Maintain a professional, neutral, and helpful tone. Use clear and \
        direct language. Use bullet points or numbered lists when it improves \
        clarity.\n\
        \n\
        ## Context ##\n\
        {context}"
    )
}

/// Format retrieved chunks into the context section, each tagged with the
/// citation identifier the answer prompt asks the model to use.
pub fn render_context(hits: &[ScoredChunk]) -> String {
    if hits.is_empty() {
        return "(no documents retrieved)".to_string();
    }

    hits.iter()
        .map(|hit| {
            let source = hit.chunk.source();
            match hit.chunk.metadata.get("page") {
                Some(page) => format!(
                    "[Source: {source}, page {page}]\n{}",
                    hit.chunk.content
                ),
                None => format!("[Source: {source}]\n{}", hit.chunk.content),
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

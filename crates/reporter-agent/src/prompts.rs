//! Analysis prompt and output clean-up.

/// System message for the analysis conversation.
pub const SYSTEM_PROMPT: &str = "You are an expert project analyst.";

/// Builds the instruction prompt around a raw report.
pub fn analysis_prompt(raw_report: &str) -> String {
    format!(
        "Analyze the following project status report:\n\n\
         --- Project Status Report ---\n\
         {raw_report}\n\
         --- End Report ---\n\n\
         Generate a response containing the following distinct sections, \
         using Markdown for formatting. \
         **Ensure there is a newline between each section title and the first \
         bullet point or text within that section.**\n\n\
         **1. Concise Summary:**\n\
         - Provide 3-5 key bullet points summarizing the overall project status \
         based on the Trello board, emails and Slack messages.\n\n\
         **2. Potential Action Items:**\n\
         - List any specific tasks, follow-ups or decisions implied by the report. \
         If none, state 'No specific action items identified'.\n\n\
         **3. Identified Risks/Blockers:**\n\
         - List any potential risks, overdue work or blockers. \
         If none, state 'No immediate risks/blockers identified'."
    )
}

/// Inserts a blank line between a bold `...:**` title and a bullet that
/// follows it directly, so Markdown renderers start a list.
pub fn post_process(analysis: &str) -> String {
    analysis
        .replace(":**\n*", ":**\n\n*")
        .replace(":**\n-", ":**\n\n-")
        .trim()
        .to_string()
}

// Cross-cutting prompt fragments shared by every generation call.
// Each service that calls the LLM keeps its own prompts.rs alongside it.

/// Output-format instruction appended to every document-producing system prompt.
/// The generated text is stored and rendered as an HTML fragment.
pub const HTML_OUTPUT_FORMAT: &str = "Output Format: You should format the text in HTML. \
Do not provide the html in code blocks, in your response do not include 'html' tag. \
It should be normal text. Simply use appropriate HTML tags that are commonly used in articles or documents. \
For instance, use <h1> for the main heading, <h2> for subheadings, and <p> for paragraphs. \
Additionally, for lists, apply <ul> with <li> for unordered lists, or <ol> with <li> for ordered lists. \
When presenting tabular data, the <table> tag should be used, alongside <tr> for rows, \
and <th> and <td> for header and data cells, respectively. \
It is important to maintain a clear and professional tone throughout the document.";

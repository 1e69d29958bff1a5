//! Prompt text and generation defaults

/// Model used when nothing else is configured.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Analyst persona sent as the system instruction of every session.
pub const SYSTEM_INSTRUCTION: &str = "\
You are an expert Senior Business Analyst and AI Consultant. Your goal is to help business owners understand their data, trends, and strategies.

Follow these guidelines for your responses:
1. **Professional & Actionable**: Use simple, professional business language. Avoid jargon where possible, or explain it.
2. **Structure**: Use bullet points for insights. Break down complex answers into steps.
3. **Data-Driven**: If the user provides metrics (Revenue, Expenses, etc.), use them to calculate margins, growth rates, or ROI in your explanation.
4. **Context Aware**: Tailor your advice specifically to the user's selected Industry.
5. **Formatting**: Use Markdown for bolding key terms and creating lists.

If the user asks about specific numbers (like \"Why are sales down?\"), look at the context provided in the prompt. If no numbers are provided, ask for them politely or give general strategic advice.";

/// Appended to the partial reply when a stream fails mid-turn.
pub const FALLBACK_NOTICE: &str =
    "\n\n(I encountered an error connecting to the analysis engine. Please try again.)";

/// First model message of a fresh transcript.
pub const GREETING: &str = "Hello! I'm your Business Insights Assistant. I can help analyze your performance, create SWOT reports, or suggest growth strategies.\n\nTo get started, tell me about your current business challenges or pick a sample question with /samples. Don't forget to set your metrics with /revenue, /expenses and /customers for more accurate insights!";

/// Model message shown after the conversation is cleared.
pub const CLEARED_GREETING: &str = "Conversation cleared. How can I help you next?";

pub const SAMPLE_QUESTIONS: [&str; 5] = [
    "Why are my sales decreasing this month?",
    "Generate a SWOT analysis for my business.",
    "How can I improve my profit margin?",
    "What marketing strategies work best for my industry?",
    "Analyze my current revenue vs expenses.",
];

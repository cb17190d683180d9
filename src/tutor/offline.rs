//! Canned offline tutor replies
//!
//! Matched against the last user message when no provider is
//! reachable. The table is checked top to bottom and the first group
//! with any keyword hit wins.

use once_cell::sync::Lazy;

/// Keyword groups paired with a canned reply, checked in order.
static KEYWORD_REPLIES: Lazy<Vec<(Vec<&'static str>, &'static str)>> = Lazy::new(|| {
    vec![
        (
            vec!["math", "algebra", "calculus", "geometry", "equation"],
            "Math builds on itself, so start by finding the last topic you were fully \
             comfortable with and work forward from there. Try solving three practice \
             problems without looking at the solutions first. Which topic tripped you up?",
        ),
        (
            vec!["program", "coding", "code", "python", "javascript", "rust"],
            "The fastest way to learn programming is to write small programs daily. Pick a \
             tiny project, get it running end to end, then improve one piece at a time. \
             What are you trying to build right now?",
        ),
        (
            vec!["science", "physics", "chemistry", "biology"],
            "For science topics, connect each new concept to something you can observe. \
             Sketch the system, label the quantities, and only then reach for formulas. \
             Which concept would you like to break down?",
        ),
        (
            vec!["language", "vocabulary", "grammar", "speaking"],
            "Language learning rewards short, frequent sessions over long cramming. Aim for \
             fifteen minutes of active practice a day and say new words out loud. Which \
             language are you working on?",
        ),
        (
            vec!["study", "focus", "remember", "exam", "memorize"],
            "Two techniques beat almost everything else: spaced repetition and testing \
             yourself before you feel ready. Close the notes, write down what you recall, \
             then check. When is your next exam?",
        ),
        (
            vec!["recommend", "course", "which", "suggest"],
            "Your dashboard recommendations are ranked from your own activity, so the top \
             few courses there are the best match for you right now. If nothing appeals, \
             try searching for a subject you enjoyed recently.",
        ),
        (
            vec!["hello", "hey", "thanks", "thank you"],
            "Hello! I'm your learning assistant. Ask me about any subject you're studying, \
             or ask for study tips and course suggestions.",
        ),
    ]
});

const DEFAULT_REPLY: &str = "I can't reach the tutoring service right now, but I'm still here. \
Try asking about a specific subject, study techniques, or what course to take next, and I'll \
do my best to help.";

/// Pick a canned reply for the given prompt.
pub fn offline_reply(prompt: &str) -> String {
    let lower = prompt.to_lowercase();
    for (keywords, reply) in KEYWORD_REPLIES.iter() {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return reply.to_string();
        }
    }
    DEFAULT_REPLY.to_string()
}

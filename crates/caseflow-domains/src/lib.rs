pub mod legal;

use caseflow_core::types::PromptSet;

/// Return every built-in prompt set.
pub fn all_prompt_sets() -> Vec<PromptSet> {
    vec![legal::collection_prompts(), legal::collection_prompts_es()]
}

/// Look up a built-in prompt set by name (with short aliases).
pub fn get_prompt_set(name: &str) -> Option<PromptSet> {
    match name {
        "en" | "legal" => get_prompt_set("collection"),
        "es" => get_prompt_set("collection_es"),
        _ => all_prompt_sets().into_iter().find(|p| p.name == name),
    }
}

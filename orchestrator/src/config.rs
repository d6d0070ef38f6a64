use serde::Deserialize;
use anyhow::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub ai_api_url: Option<String>,
    pub ai_api_key: Option<String>,
    pub primary_model: String,
    pub fallback_model: String,
    pub ai_timeout_secs: u64,
    pub local_qa_path: String,
    pub wiki_search_url: String,
    pub wiki_summary_url: String,
    pub web_timeout_secs: u64,
    pub web_user_agent: String,
    pub assistant_name: String,
    pub system_prompt: Option<String>,
    pub static_dir: String,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            port: var("PORT")
                .unwrap_or_else(|| "5000".to_string())
                .parse()?,
            ai_api_url: var("AI_API_URL"),
            ai_api_key: var("AI_API_KEY"),
            primary_model: var("AI_PRIMARY_MODEL")
                .unwrap_or_else(|| "meta-llama/llama-3.3-70b-instruct:free".to_string()),
            fallback_model: var("AI_FALLBACK_MODEL")
                .unwrap_or_else(|| "openai/gpt-oss-20b:free".to_string()),
            ai_timeout_secs: var("AI_TIMEOUT_SECS")
                .unwrap_or_else(|| "30".to_string())
                .parse()?,
            local_qa_path: var("LOCAL_QA_PATH")
                .unwrap_or_else(|| "data/qa.txt".to_string()),
            wiki_search_url: var("WIKI_SEARCH_URL")
                .unwrap_or_else(|| "https://en.wikipedia.org/w/api.php".to_string()),
            wiki_summary_url: var("WIKI_SUMMARY_URL")
                .unwrap_or_else(|| "https://en.wikipedia.org/api/rest_v1/page/summary".to_string()),
            web_timeout_secs: var("WEB_TIMEOUT_SECS")
                .unwrap_or_else(|| "8".to_string())
                .parse()?,
            web_user_agent: var("WEB_USER_AGENT")
                .unwrap_or_else(|| "ChatOrchestrator/1.0".to_string()),
            assistant_name: var("ASSISTANT_NAME")
                .unwrap_or_else(|| "Assistant".to_string()),
            system_prompt: var("SYSTEM_PROMPT"),
            static_dir: var("STATIC_DIR")
                .unwrap_or_else(|| "static".to_string()),
            log_level: var("LOG_LEVEL")
                .unwrap_or_else(|| "info".to_string()),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 5000,
            ai_api_url: None,
            ai_api_key: None,
            primary_model: "meta-llama/llama-3.3-70b-instruct:free".to_string(),
            fallback_model: "openai/gpt-oss-20b:free".to_string(),
            ai_timeout_secs: 30,
            local_qa_path: "data/qa.txt".to_string(),
            wiki_search_url: "https://en.wikipedia.org/w/api.php".to_string(),
            wiki_summary_url: "https://en.wikipedia.org/api/rest_v1/page/summary".to_string(),
            web_timeout_secs: 8,
            web_user_agent: "ChatOrchestrator/1.0".to_string(),
            assistant_name: "Assistant".to_string(),
            system_prompt: None,
            static_dir: "static".to_string(),
            log_level: "info".to_string(),
        }
    }
}

// Empty values count as unset.
fn var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

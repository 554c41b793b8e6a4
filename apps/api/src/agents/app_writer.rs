//! Application Writer: cover letters for a job and profile.

use tracing::warn;

use crate::agents::prompts::{COVER_LETTER_PROMPT_TEMPLATE, COVER_LETTER_SYSTEM};
use crate::llm_client::{ChatModel, ChatRequest};
use crate::models::profile::{JobItem, UserProfile};

const NOT_PROVIDED: &str = "Available upon request";

fn job_prompt_text(job: &JobItem) -> String {
    format!(
        "Position: {}\nCompany: {}\nLocation: {}\nDescription: {}",
        job.title,
        job.company,
        job.location.as_deref().unwrap_or("Not specified"),
        job.desc.as_deref().unwrap_or_default(),
    )
}

fn profile_prompt_text(profile: &UserProfile) -> String {
    let skills = if profile.skills().is_empty() {
        "Various technical skills".to_string()
    } else {
        profile.skills().join(", ")
    };
    format!(
        "Name: {}\nSkills: {skills}\nLinkedIn: {}\nEmail: {}",
        candidate_name(profile),
        profile.linkedin_url.as_deref().unwrap_or(NOT_PROVIDED),
        profile.email.as_deref().unwrap_or(NOT_PROVIDED),
    )
}

fn candidate_name(profile: &UserProfile) -> &str {
    profile
        .name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or("Candidate")
}

fn leading_skills(profile: &UserProfile, n: usize, fallback: &str) -> String {
    match profile.skills() {
        [] => fallback.to_string(),
        skills => skills[..n.min(skills.len())].join(", "),
    }
}

/// Drafts a cover letter. Model errors fall back to `template_cover_letter`.
pub async fn draft_cover_letter(
    llm: Option<&dyn ChatModel>,
    job: &JobItem,
    profile: &UserProfile,
) -> String {
    let Some(llm) = llm else {
        return template_cover_letter(job, profile);
    };

    let prompt = COVER_LETTER_PROMPT_TEMPLATE
        .replace("{job_text}", &job_prompt_text(job))
        .replace("{profile_text}", &profile_prompt_text(profile));

    let reply = llm
        .complete(ChatRequest {
            system: Some(COVER_LETTER_SYSTEM),
            prompt: &prompt,
            max_tokens: 800,
            temperature: 0.7,
        })
        .await;

    match reply {
        Ok(letter) if !letter.trim().is_empty() => letter.trim().to_string(),
        Ok(_) => {
            warn!("Cover letter reply was empty, using template");
            template_cover_letter(job, profile)
        }
        Err(e) => {
            warn!("Cover letter generation failed: {e}");
            template_cover_letter(job, profile)
        }
    }
}

pub fn template_cover_letter(job: &JobItem, profile: &UserProfile) -> String {
    format!(
        "Dear Hiring Manager,\n\n\
         I am writing to express my strong interest in the {title} position at {company}. \
         With my background in {top_three}, I am excited about the opportunity to contribute to your team.\n\n\
         I am particularly drawn to {company} because of your innovative approach and commitment to excellence. \
         My experience with {top_two} aligns well with the requirements for this role.\n\n\
         I am eager to discuss how my skills and enthusiasm can contribute to your organization's continued success.\n\n\
         Best regards,\n{name}",
        title = job.title,
        company = job.company,
        top_three = leading_skills(profile, 3, "technology"),
        top_two = leading_skills(profile, 2, "various technologies"),
        name = candidate_name(profile),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedModel;

    fn job() -> JobItem {
        JobItem {
            id: "j1".to_string(),
            source: "sample".to_string(),
            title: "Rust Intern".to_string(),
            company: "Ferrous".to_string(),
            location: None,
            url: "https://jobs.test/j1".to_string(),
            desc: Some("Build async services".to_string()),
        }
    }

    fn profile(name: Option<&str>, skills: &[&str]) -> UserProfile {
        UserProfile {
            name: name.map(String::from),
            skills: Some(skills.iter().map(|s| s.to_string()).collect()),
            ..UserProfile::default()
        }
    }

    #[tokio::test]
    async fn test_model_reply_is_trimmed() {
        let model = ScriptedModel::new(["\n  Dear Ferrous team,\nHire me.  \n"]);
        let letter = draft_cover_letter(Some(&model), &job(), &profile(Some("Ada"), &["Rust"])).await;
        assert_eq!(letter, "Dear Ferrous team,\nHire me.");

        let prompt = &model.prompts()[0];
        assert!(prompt.contains("Position: Rust Intern"));
        assert!(prompt.contains("Location: Not specified"));
        assert!(prompt.contains("Skills: Rust"));
        assert!(prompt.contains("Email: Available upon request"));
    }

    #[tokio::test]
    async fn test_model_failure_uses_template() {
        let model = ScriptedModel::failing(500);
        let p = profile(Some("Ada"), &["Rust", "Tokio", "SQL", "Docker"]);
        let letter = draft_cover_letter(Some(&model), &job(), &p).await;

        assert_eq!(letter, template_cover_letter(&job(), &p));
        assert!(letter.starts_with("Dear Hiring Manager,"));
        assert!(letter.contains("background in Rust, Tokio, SQL,"));
        assert!(letter.contains("experience with Rust, Tokio aligns"));
        assert!(letter.ends_with("Best regards,\nAda"));
    }

    #[tokio::test]
    async fn test_template_defaults_without_skills_or_name() {
        let letter = draft_cover_letter(None, &job(), &UserProfile::default()).await;
        assert!(letter.contains("background in technology,"));
        assert!(letter.contains("experience with various technologies aligns"));
        assert!(letter.ends_with("Candidate"));
    }

    #[test]
    fn test_template_with_single_skill() {
        let letter = template_cover_letter(&job(), &profile(None, &["Go"]));
        assert!(letter.contains("background in Go,"));
        assert!(letter.contains("experience with Go aligns"));
    }
}

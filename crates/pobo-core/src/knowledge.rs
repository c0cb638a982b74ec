//! The fixed, hand-curated résumé knowledge base.
//!
//! Records are built fresh on every call so the timestamp reflects the
//! initialization run. Re-initialization replaces the whole set by id.

use chrono::{SecondsFormat, Utc};
use sha2::{Digest, Sha256};

use crate::models::{Category, KnowledgeRecord};

const RECORDS: &[(&str, Category, &str, &str)] = &[
    (
        "exp-cognizant",
        Category::Experience,
        "Cognizant",
        "Associate - Projects at Cognizant from 18th Feb 2025 – Present in Kolkata. Generative AI Based Product Development, Prompt Engineering and RAG, Integrating Existing RPA Solution with Gen AI.",
    ),
    (
        "exp-mphasis",
        Category::Experience,
        "Mphasis",
        "Senior Software Developer at Mphasis from 16th Aug 2021 – 04th Feb 2025 in Pune. Full Stack Development and Team Leadership, Code Review and Resolution, CI/CD Pipeline Implementation, Version Control and Code Backup, Technological Proficiency, Programming Proficiency.",
    ),
    (
        "skills-programming",
        Category::Skills,
        "Technical Skills",
        "Programming Languages: Python, Java, JavaScript, TypeScript, C, React.js, Node.js, HTML, CSS, SQL, MongoDB, PostgreSQL, AWS, Docker, Kubernetes, Jenkins, Git, JIRA, UiPath, Pega Robotics, Power Automate, Kore.ai XO Platform, GPT-3.5-turbo, GPT-4, Llama, Hugging Face, Sage Maker, AWS Textract, Lambda, CloudFront, S3, DynamoDB, Bedrock.",
    ),
    (
        "project-doxpro",
        Category::Projects,
        "DoxPro",
        "DoxPro - Intelligent Document Processing Tool (Insurance Domain, 01/2024 – Present, Bangalore). Gen AI-based intelligent document processing tool using React for front-end design and Lambda in Python for extracting data using AWS Textract. Data passed to LLM for extraction and classification using GPT-3.5-turbo and GPT-4 models.",
    ),
    (
        "project-customer-dashboard",
        Category::Projects,
        "Customer Profile Dashboard",
        "Customer Profile Dashboard (Banking Domain, 01/2024 – Present, Bangalore). Gen AI based tool for helping Call Center agents for giving an insight of customer during live call. Uses React, Python/Lambda, AWS Textract, GPT-3.5-turbo, GPT-4.",
    ),
    (
        "project-hr-bot",
        Category::Projects,
        "HR Assistant BOT",
        "HR Assistant BOT (Mphasis R&D, 01/2024 – 02/2024, Bangalore). Designed, Developed and deployed a HR Assistant AI chatbot using Kore.ai XO Platform. HR assistant Bot which helps HR to get the details, managing details about the employee of the organization.",
    ),
    (
        "edu-btech",
        Category::Education,
        "B.Tech",
        "Bachelor of Technology in Information Technology from Heritage Institute of Technology (Autonomous) from 08/2018 – 07/2021.",
    ),
    (
        "edu-diploma",
        Category::Education,
        "Diploma",
        "Diploma in Computer Science and Technology from The Calcutta Technical School (Govt.) from 07/2015 – 07/2018.",
    ),
    (
        "contact-info",
        Category::Contact,
        "Contact Details",
        "Contact Information: Email: write2pabitra@gmail.com, Mobile: +918967717327, LinkedIn: https://www.linkedin.com/in/pabitra-jiban/, GitHub: https://github.com/pabitra-jiban.",
    ),
    (
        "achievement-persona",
        Category::Achievements,
        "Persona Award",
        "Persona Award - Synergic Workforce Individual award for excellent contribution Team award for delivering the client project before timeline without any major defects in production.",
    ),
    (
        "achievement-pinnacle",
        Category::Achievements,
        "Pinnacle Award",
        "Pinnacle Award - Kudos Individual Award for developing valuable internal assets as a part of Mphasis research and development team.",
    ),
];

/// Build the knowledge record set, stamped with the current time.
pub fn knowledge_records() -> Vec<KnowledgeRecord> {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    RECORDS
        .iter()
        .map(|(id, category, source, text)| KnowledgeRecord {
            id: id.to_string(),
            text: text.to_string(),
            category: *category,
            source: source.to_string(),
            timestamp: timestamp.clone(),
        })
        .collect()
}

/// SHA-256 over `id\ntext\n` of each record, in order.
///
/// Timestamps are excluded so the fingerprint identifies the content
/// revision, not the run.
pub fn knowledge_fingerprint(records: &[KnowledgeRecord]) -> String {
    let mut hasher = Sha256::new();
    for r in records {
        hasher.update(r.id.as_bytes());
        hasher.update(b"\n");
        hasher.update(r.text.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

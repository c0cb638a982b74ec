//! Static knowledge snapshot used when the vector path cannot serve.
//!
//! This is a hand-maintained copy of the facts in [`crate::knowledge`]. The
//! two are edited independently; `test_fallback_covers_every_record` fails
//! when a record is added or renamed without updating this block.

pub const FALLBACK_KNOWLEDGE: &str = "\
PABITRA JIBAN MAITY - PROFESSIONAL PROFILE

CONTACT INFORMATION:
- Email: write2pabitra@gmail.com
- Mobile: +918967717327
- LinkedIn: https://www.linkedin.com/in/pabitra-jiban/
- GitHub: https://github.com/pabitra-jiban

EXPERIENCE:
1. Associate - Projects at Cognizant (18th Feb 2025 – Present, Kolkata)
   - Generative AI Based Product Development
   - Prompt Engineering and RAG
   - Integrating Existing RPA Solution with Gen AI

2. Senior Software Developer at Mphasis (16th Aug 2021 – 04th Feb 2025, Pune)
   - Full Stack Development and Team Leadership
   - Code Review and Resolution
   - CI/CD Pipeline Implementation
   - Version Control and Code Backup
   - Technological Proficiency in Generative AI, Java, Python, React.js
   - RPA technologies: Pega Robotics, UiPath, Power Automate

SKILLS:
- Programming Languages: Python, Java, JavaScript, TypeScript, C, React.js, Node.js
- Databases: SQL, MongoDB, PostgreSQL
- Cloud & DevOps: AWS, Docker, Kubernetes, Jenkins, Git, JIRA
- RPA Tools: UiPath, Pega Robotics, Power Automate
- AI/ML: Kore.ai XO Platform, GPT-3.5-turbo, GPT-4, Llama, Hugging Face, Sage Maker
- AWS Services: Textract, Lambda, CloudFront, S3, DynamoDB, Bedrock

PROJECTS:
1. DoxPro - Intelligent Document Processing Tool (Insurance Domain, 01/2024 – Present)
   - Gen AI-based document processing using React and Python/Lambda
   - AWS Textract integration with GPT-3.5-turbo and GPT-4

2. Customer Profile Dashboard (Banking Domain, 01/2024 – Present)
   - Gen AI tool for Call Center agents
   - React frontend with Python/Lambda backend

3. HR Assistant BOT (Mphasis R&D, 01/2024 – 02/2024)
   - AI chatbot using Kore.ai XO Platform
   - HR process automation

EDUCATION:
- Bachelor of Technology in Information Technology, Heritage Institute of Technology (08/2018 – 07/2021)
- Diploma in Computer Science and Technology, The Calcutta Technical School (07/2015 – 07/2018)

ACHIEVEMENTS:
- Persona Award - Synergic Workforce Individual award
- Pinnacle Award - Kudos Individual Award for developing valuable internal assets

LANGUAGES: English (Proficient), Hindi (Proficient), Bengali (Native)
";

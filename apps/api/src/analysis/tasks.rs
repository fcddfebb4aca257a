//! Catalogue of the analyses a session can request.

use serde::{Deserialize, Serialize};

use crate::models::analysis::Instruction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisTask {
    Summary,
    PercentageMatch,
    SkillImprovement,
    MissingKeywords,
    InterviewPrep,
    Recommendations,
    RoleFitment,
    SkillProficiency,
    TopSkills,
}

impl AnalysisTask {
    pub const ALL: [AnalysisTask; 9] = [
        AnalysisTask::Summary,
        AnalysisTask::PercentageMatch,
        AnalysisTask::SkillImprovement,
        AnalysisTask::MissingKeywords,
        AnalysisTask::InterviewPrep,
        AnalysisTask::Recommendations,
        AnalysisTask::RoleFitment,
        AnalysisTask::SkillProficiency,
        AnalysisTask::TopSkills,
    ];

    pub fn title(self) -> &'static str {
        match self {
            AnalysisTask::Summary => "Resume Summary",
            AnalysisTask::PercentageMatch => "Match Percentage",
            AnalysisTask::SkillImprovement => "Skill Improvement",
            AnalysisTask::MissingKeywords => "Missing Keywords",
            AnalysisTask::InterviewPrep => "Interview Questions",
            AnalysisTask::Recommendations => "Recommendations",
            AnalysisTask::RoleFitment => "Fit Score",
            AnalysisTask::SkillProficiency => "Skill Proficiency",
            AnalysisTask::TopSkills => "Relevant Skills",
        }
    }

    fn text(self) -> &'static str {
        match self {
            AnalysisTask::Summary => {
                "Provide a detailed professional summary of this resume, highlighting key \
                 qualifications, experiences, and notable achievements."
            }
            AnalysisTask::PercentageMatch => {
                "Compare the resume with the job description and return only the match \
                 percentage out of 100. Format: 'The match is 87%'."
            }
            AnalysisTask::SkillImprovement => {
                "Analyze the skills in the resume against the job description. For each skill \
                 in the job description, state whether it is present or missing in the resume, \
                 and suggest areas of improvement."
            }
            AnalysisTask::MissingKeywords => {
                "List the most important keywords missing from the resume compared to the job \
                 description."
            }
            AnalysisTask::InterviewPrep => {
                "Generate 5 potential interview questions based on this resume and job \
                 description. Include both technical and behavioral questions."
            }
            AnalysisTask::Recommendations => {
                "Provide 3 concrete suggestions to improve this resume for the specific job, \
                 including relevant courses, certifications, or projects."
            }
            AnalysisTask::RoleFitment => {
                "Rate the overall fit between this resume and job description on a scale of \
                 1-10 with justification."
            }
            AnalysisTask::SkillProficiency => {
                "Evaluate the proficiency level (basic, intermediate, advanced) of each skill \
                 the job description requires, and explain how the candidate could improve."
            }
            AnalysisTask::TopSkills => {
                "List the top 10 skills from the resume that are most relevant to the job \
                 description."
            }
        }
    }

    /// Only the match task asks the model for a `NN%` answer.
    pub fn expects_percentage(self) -> bool {
        matches!(self, AnalysisTask::PercentageMatch)
    }

    pub fn instruction(self) -> Instruction {
        if self.expects_percentage() {
            Instruction::expecting_percentage(self.text())
        } else {
            Instruction::new(self.text())
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaskDescriptor {
    pub task: AnalysisTask,
    pub title: &'static str,
    pub expects_percentage: bool,
}

pub fn catalogue() -> Vec<TaskDescriptor> {
    AnalysisTask::ALL
        .into_iter()
        .map(|task| TaskDescriptor {
            task,
            title: task.title(),
            expects_percentage: task.expects_percentage(),
        })
        .collect()
}

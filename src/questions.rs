//! Question bank
//!
//! Process-wide, read-only pool of categorized questions, initialized once at
//! startup. Ships with a built-in set; `QUESTION_BANK_PATH` can point at a
//! JSON file (an array of questions) to replace it.

use crate::error::{GameError, GameResult};
use crate::types::{Difficulty, Question};
use std::collections::HashMap;
use std::path::Path;

pub struct QuestionBank {
    by_category: HashMap<String, Vec<Question>>,
}

impl QuestionBank {
    fn from_questions(questions: Vec<Question>) -> Self {
        let mut by_category: HashMap<String, Vec<Question>> = HashMap::new();
        for q in questions {
            by_category.entry(q.category.clone()).or_default().push(q);
        }
        Self { by_category }
    }

    /// Load a bank from a JSON file containing an array of questions
    pub fn from_json_file(path: &Path) -> Result<Self, String> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
        let questions: Vec<Question> = serde_json::from_str(&data)
            .map_err(|e| format!("failed to parse {}: {}", path.display(), e))?;
        if questions.is_empty() {
            return Err(format!("{} contains no questions", path.display()));
        }
        for q in &questions {
            if q.correct_option >= q.options.len() {
                return Err(format!(
                    "question {} has correct_option {} out of range",
                    q.id, q.correct_option
                ));
            }
        }
        tracing::info!(
            "Loaded {} questions from {}",
            questions.len(),
            path.display()
        );
        Ok(Self::from_questions(questions))
    }

    /// Questions for a category in deterministic (bank) order.
    ///
    /// Fails with `NotFound` if the category is unknown or empty.
    pub fn questions_for_category(&self, category: &str) -> GameResult<Vec<Question>> {
        match self.by_category.get(category) {
            Some(questions) if !questions.is_empty() => Ok(questions.clone()),
            _ => Err(GameError::NotFound(format!(
                "No questions available for category '{}'",
                category
            ))),
        }
    }

    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self.by_category.keys().cloned().collect();
        categories.sort();
        categories
    }
}

fn q(
    id: &str,
    prompt: &str,
    options: [&str; 4],
    correct_option: usize,
    category: &str,
    difficulty: Difficulty,
    explanation: Option<&str>,
) -> Question {
    Question {
        id: id.to_string(),
        prompt: prompt.to_string(),
        options: options.iter().map(|s| s.to_string()).collect(),
        correct_option,
        category: category.to_string(),
        difficulty,
        explanation: explanation.map(|s| s.to_string()),
    }
}

impl Default for QuestionBank {
    /// The built-in question set, mirroring the categories of the shipped game
    fn default() -> Self {
        use Difficulty::*;

        let questions = vec![
            // science
            q(
                "sci-001",
                "What is the chemical symbol for gold?",
                ["Au", "Ag", "Gd", "Go"],
                0,
                "science",
                Easy,
                Some("From the Latin 'aurum'."),
            ),
            q(
                "sci-002",
                "Which planet has the most moons?",
                ["Jupiter", "Mars", "Saturn", "Neptune"],
                2,
                "science",
                Medium,
                Some("Saturn overtook Jupiter with 146 confirmed moons."),
            ),
            q(
                "sci-003",
                "What particle carries a negative electric charge?",
                ["Proton", "Neutron", "Electron", "Photon"],
                2,
                "science",
                Easy,
                None,
            ),
            q(
                "sci-004",
                "Roughly how fast does light travel in a vacuum?",
                ["300 km/s", "3,000 km/s", "30,000 km/s", "300,000 km/s"],
                3,
                "science",
                Medium,
                None,
            ),
            q(
                "sci-005",
                "What is the powerhouse of the cell?",
                ["Ribosome", "Mitochondrion", "Nucleus", "Golgi apparatus"],
                1,
                "science",
                Easy,
                None,
            ),
            // history
            q(
                "his-001",
                "In which year did the Berlin Wall fall?",
                ["1985", "1989", "1991", "1993"],
                1,
                "history",
                Easy,
                None,
            ),
            q(
                "his-002",
                "Who was the first emperor of Rome?",
                ["Julius Caesar", "Augustus", "Nero", "Caligula"],
                1,
                "history",
                Medium,
                Some("Caesar was never emperor; Augustus founded the principate."),
            ),
            q(
                "his-003",
                "The Hundred Years' War was fought between which two kingdoms?",
                [
                    "England and France",
                    "Spain and Portugal",
                    "France and Prussia",
                    "England and Scotland",
                ],
                0,
                "history",
                Medium,
                None,
            ),
            q(
                "his-004",
                "Which civilization built Machu Picchu?",
                ["Aztec", "Maya", "Inca", "Olmec"],
                2,
                "history",
                Easy,
                None,
            ),
            // geography
            q(
                "geo-001",
                "What is the longest river in the world?",
                ["Amazon", "Nile", "Yangtze", "Mississippi"],
                1,
                "geography",
                Medium,
                Some("By most measurements the Nile edges out the Amazon."),
            ),
            q(
                "geo-002",
                "Which country has the most time zones?",
                ["Russia", "USA", "France", "China"],
                2,
                "geography",
                Hard,
                Some("Twelve, counting its overseas territories."),
            ),
            q(
                "geo-003",
                "What is the capital of Australia?",
                ["Sydney", "Melbourne", "Canberra", "Perth"],
                2,
                "geography",
                Easy,
                None,
            ),
            q(
                "geo-004",
                "Which desert is the largest in the world?",
                ["Sahara", "Gobi", "Arabian", "Antarctic"],
                3,
                "geography",
                Hard,
                Some("Antarctica qualifies as a polar desert."),
            ),
            // pop-culture
            q(
                "pop-001",
                "Which film won the first Academy Award for Best Picture?",
                ["Wings", "Sunrise", "Metropolis", "The Jazz Singer"],
                0,
                "pop-culture",
                Hard,
                None,
            ),
            q(
                "pop-002",
                "Which band released the album 'Abbey Road'?",
                [
                    "The Rolling Stones",
                    "The Beatles",
                    "The Who",
                    "Pink Floyd",
                ],
                1,
                "pop-culture",
                Easy,
                None,
            ),
            q(
                "pop-003",
                "In which fictional city does Batman operate?",
                ["Metropolis", "Gotham City", "Star City", "Central City"],
                1,
                "pop-culture",
                Easy,
                None,
            ),
            q(
                "pop-004",
                "Which TV series features the Iron Throne?",
                [
                    "The Witcher",
                    "Vikings",
                    "Game of Thrones",
                    "The Wheel of Time",
                ],
                2,
                "pop-culture",
                Easy,
                None,
            ),
            // technology
            q(
                "tec-001",
                "What does 'HTTP' stand for?",
                [
                    "HyperText Transfer Protocol",
                    "High Throughput Transfer Process",
                    "Hyperlink Text Transport Protocol",
                    "Host Transfer Text Protocol",
                ],
                0,
                "technology",
                Easy,
                None,
            ),
            q(
                "tec-002",
                "Who co-founded Apple alongside Steve Jobs?",
                [
                    "Bill Gates",
                    "Steve Wozniak",
                    "Paul Allen",
                    "Jony Ive",
                ],
                1,
                "technology",
                Easy,
                None,
            ),
            q(
                "tec-003",
                "In what decade was the first email sent?",
                ["1960s", "1970s", "1980s", "1990s"],
                1,
                "technology",
                Medium,
                Some("Ray Tomlinson sent it over ARPANET in 1971."),
            ),
            q(
                "tec-004",
                "Which company developed the Rust programming language?",
                ["Google", "Microsoft", "Mozilla", "Facebook"],
                2,
                "technology",
                Medium,
                None,
            ),
        ];

        Self::from_questions(questions)
    }
}

//! The fixed topic catalog loaded into an empty database.

use crate::entities::NewTopic;
use crate::types::Difficulty;

pub const GEOGRAPHY_TOPICS: &[NewTopic] = &[
    NewTopic {
        name: "World Capitals",
        description: "Learn about capital cities around the world",
        difficulty: Difficulty::Easy,
        sample_questions: &[
            "What is the capital of Australia?",
            "Which city is the capital of Canada?",
            "What is the capital of Brazil?",
        ],
    },
    NewTopic {
        name: "Physical Geography",
        description: "Mountains, rivers, deserts, and natural features",
        difficulty: Difficulty::Medium,
        sample_questions: &[
            "What is the longest river in the world?",
            "Which mountain range separates Europe from Asia?",
            "Where is the Sahara Desert located?",
        ],
    },
    NewTopic {
        name: "Countries & Continents",
        description: "Learn about countries, their locations, and continents",
        difficulty: Difficulty::Easy,
        sample_questions: &[
            "Which continent is Egypt located in?",
            "What countries border France?",
            "Which is the largest country in South America?",
        ],
    },
    NewTopic {
        name: "Climate & Weather",
        description: "Weather patterns, climate zones, and atmospheric phenomena",
        difficulty: Difficulty::Hard,
        sample_questions: &[
            "What causes monsoons in South Asia?",
            "Why is the Amazon rainforest important for global climate?",
            "What is the difference between weather and climate?",
        ],
    },
    NewTopic {
        name: "Oceans & Seas",
        description: "Bodies of water, marine geography, and coastal features",
        difficulty: Difficulty::Medium,
        sample_questions: &[
            "What are the five major oceans?",
            "Which sea is between Europe and Africa?",
            "What is the deepest point in the ocean?",
        ],
    },
];

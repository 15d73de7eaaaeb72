//! Prompt templates and response schemas sent to the advisor

use serde_json::{json, Value};
use shakmaty::Color;

use crate::rules::side_name;

pub fn analysis_prompt(history: &str) -> String {
    format!(
        "You are an expert chess coach analyzing a completed game.\n\
         \n\
         Provide insights into the player's strengths and weaknesses, key moments in the game, \
         and an overall assessment of their performance.\n\
         \n\
         Game History (SAN): {}\n\
         \n\
         Analyze the game and provide the following:\n\
         - strengths: a summary of the player's strengths based on the game.\n\
         - weaknesses: a summary of the player's weaknesses based on the game.\n\
         - keyMoments: the moments where the player made significant decisions, good and bad.\n\
         - overallAssessment: an overall assessment of the player's performance.\n\
         \n\
         Respond with a JSON object matching the schema.",
        history
    )
}

pub fn suggestion_prompt(fen: &str, side: Color) -> String {
    format!(
        "You are a grandmaster chess player. Analyze the current position and suggest the best \
         move for {side}.\n\
         \n\
         Board State (FEN): {fen}\n\
         \n\
         Give the move in coordinate notation (e.g. e2e4, or e7e8q for a promotion) in \
         \"suggestedMove\" and a one-sentence reason in \"explanation\". The move must be legal \
         in this position. Consider tactics, piece activity and long-term plans.",
        side = side_name(side).to_lowercase(),
        fen = fen,
    )
}

pub fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "strengths": {
                "type": "STRING",
                "description": "A summary of the player's strengths based on the game."
            },
            "weaknesses": {
                "type": "STRING",
                "description": "A summary of the player's weaknesses based on the game."
            },
            "keyMoments": {
                "type": "STRING",
                "description": "Key moments where the player made significant decisions, both good and bad."
            },
            "overallAssessment": {
                "type": "STRING",
                "description": "An overall assessment of the player's performance in the game."
            }
        },
        "required": ["strengths", "weaknesses", "keyMoments", "overallAssessment"]
    })
}

pub fn suggestion_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "suggestedMove": {
                "type": "STRING",
                "description": "The suggested move in coordinate notation, e.g. e2e4."
            },
            "explanation": {
                "type": "STRING",
                "description": "One sentence on why the move is good."
            }
        },
        "required": ["suggestedMove", "explanation"]
    })
}

//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Solutions never leave the server through these types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{ExerciseDefinition, ExerciseId, ExerciseKind, ExerciseSet, InputMode};
use crate::session::{Evaluation, InputValue};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    /// Start a fresh session on a set; `None` selects the default set.
    LoadSet {
        #[serde(default)]
        exercise: Option<String>,
    },
    Input {
        #[serde(rename = "exerciseId")]
        exercise_id: ExerciseId,
        text: String,
    },
    FieldInput {
        #[serde(rename = "exerciseId")]
        exercise_id: ExerciseId,
        field: String,
        value: String,
    },
    Reset {
        #[serde(rename = "exerciseId")]
        exercise_id: ExerciseId,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Tabs {
        title: String,
        names: Vec<String>,
        totals: Vec<usize>,
    },
    TabContent {
        index: usize,
        html: String,
    },
    TabScore {
        index: usize,
        completed: usize,
    },
    TotalScore {
        completed: usize,
        total: usize,
    },
    Preview {
        #[serde(rename = "exerciseId")]
        exercise_id: ExerciseId,
        html: String,
    },
    Example {
        #[serde(rename = "exerciseId")]
        exercise_id: ExerciseId,
        html: String,
    },
    /// Value the input controls must show, sent when the server replaced it.
    Input {
        #[serde(rename = "exerciseId")]
        exercise_id: ExerciseId,
        value: InputValue,
    },
    Feedback {
        #[serde(flatten)]
        evaluation: Evaluation,
    },
    Error {
        message: String,
    },
}

/// Exercise as shown to a client: everything but the solution.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseOut {
    pub id: ExerciseId,
    pub kind: ExerciseKind,
    pub tab: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub input: InputMode,
    /// Textarea start text.
    pub initial: String,
    /// Field start values (field mode only).
    pub initial_fields: BTreeMap<String, String>,
    pub fields: Vec<String>,
    pub html: Option<String>,
    pub max_score: u32,
}

impl From<&ExerciseDefinition> for ExerciseOut {
    fn from(ex: &ExerciseDefinition) -> Self {
        let (fields, initial_fields) = match ex.input {
            InputMode::Textarea => (Vec::new(), BTreeMap::new()),
            InputMode::Fields => {
                let names = ex.field_names();
                let values = names
                    .iter()
                    .map(|f| (f.to_string(), ex.initial.field(f).to_string()))
                    .collect();
                (names.into_iter().map(String::from).collect(), values)
            }
        };
        Self {
            id: ex.id,
            kind: ex.kind,
            tab: ex.tab.clone(),
            title: ex.title.clone(),
            description: ex.description.clone(),
            input: ex.input,
            initial: ex.initial.as_text().to_string(),
            initial_fields,
            fields,
            html: ex.html.clone(),
            max_score: ex.max_score,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TabOut {
    pub key: String,
    pub name: String,
    pub instructions: String,
}

/// Set layout for `GET /api/v1/set`.
#[derive(Debug, Serialize)]
pub struct SetOut {
    pub name: String,
    pub title: String,
    pub tabs: Vec<TabOut>,
    pub exercises: Vec<ExerciseOut>,
    pub explanation: Option<String>,
}

pub fn to_set_out(set: &ExerciseSet) -> SetOut {
    SetOut {
        name: set.name.clone(),
        title: set.title.clone(),
        tabs: set
            .tab_order()
            .into_iter()
            .map(|key| {
                let t = set.tab_info(key);
                TabOut { key: t.key, name: t.name, instructions: t.instructions }
            })
            .collect(),
        exercises: set.exercises.iter().map(ExerciseOut::from).collect(),
        explanation: set.explanation.clone(),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct SetQuery {
    pub exercise: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SetSummary {
    pub name: String,
    pub title: String,
    pub exercises: usize,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateIn {
    #[serde(default)]
    pub exercise: Option<String>,
    #[serde(rename = "exerciseId")]
    pub exercise_id: ExerciseId,
    pub answer: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateOut {
    pub correct: bool,
    pub score: u32,
    pub max_score: u32,
    pub message: Option<String>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InitialInput;

    #[test]
    fn client_messages_use_snake_case_tags() {
        let m: ClientWsMessage =
            serde_json::from_str(r#"{"type":"field_input","exerciseId":3,"field":"width","value":"5px"}"#).unwrap();
        assert!(matches!(m, ClientWsMessage::FieldInput { exercise_id: 3, .. }));
        let m: ClientWsMessage = serde_json::from_str(r#"{"type":"load_set"}"#).unwrap();
        assert!(matches!(m, ClientWsMessage::LoadSet { exercise: None }));
    }

    #[test]
    fn exercise_out_hides_the_solution() {
        let mut ex = ExerciseDefinition::new(1, ExerciseKind::Css, "t", "", "secret: 1;");
        ex.input = InputMode::Fields;
        ex.fields = vec!["width".into()];
        ex.initial = InitialInput::Fields([("width".to_string(), "5px".to_string())].into_iter().collect());
        let json = serde_json::to_value(ExerciseOut::from(&ex)).unwrap();
        assert!(!json.to_string().contains("secret"));
        assert_eq!(json["initialFields"]["width"], "5px");
        assert_eq!(json["input"], "fields");
        assert_eq!(json["maxScore"], 1);
    }

    #[test]
    fn feedback_flattens_the_evaluation() {
        use crate::compare::ComparisonResult;
        use crate::session::{feedback_html, Status};
        let result = ComparisonResult::correct(5);
        let msg = ServerWsMessage::Feedback {
            evaluation: Evaluation {
                exercise_id: 2,
                status: Status::Correct,
                feedback: feedback_html(&result),
                result,
                max_score: 5,
                score_update: None,
            },
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "feedback");
        assert_eq!(json["exerciseId"], 2);
        assert_eq!(json["result"]["score"], 5);
        assert_eq!(json["status"], "correct");
    }
}

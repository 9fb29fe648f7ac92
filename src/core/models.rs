//! The fixed set of models offered to users.
use serde::Serialize;

use crate::huggingface::Model;

/// Label shown to users and the model id it stands for. The first
/// entry is the default selection.
const MODEL_TABLE: &[(&str, &str)] = &[
    ("Llama 3.3 70B (Advanced)", "meta-llama/Llama-3.3-70B-Instruct"),
    ("GPT-2 (Basic)", "gpt2"),
];

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ModelOption {
    pub label: &'static str,
    #[serde(flatten)]
    pub model: Model,
}

pub fn model_options() -> Vec<ModelOption> {
    MODEL_TABLE
        .iter()
        .map(|(label, id)| ModelOption {
            label: *label,
            model: Model::new(id),
        })
        .collect()
}

pub fn default_model() -> Model {
    let (_, id) = MODEL_TABLE[0];
    Model::new(id)
}

/// Looks up a model in the table by its label or its id.
pub fn find_model(selection: &str) -> Option<Model> {
    MODEL_TABLE
        .iter()
        .find(|(label, id)| *label == selection || *id == selection)
        .map(|(_, id)| Model::new(id))
}

/// Like `find_model` but accepts any other model id as a custom
/// model.
pub fn resolve_model(selection: &str) -> Model {
    find_model(selection).unwrap_or_else(|| Model::new(selection))
}

/// The label for a model id if it is one of the offered models.
pub fn label_for(model: &Model) -> Option<&'static str> {
    MODEL_TABLE
        .iter()
        .find(|(_, id)| *id == model.id)
        .map(|(label, _)| *label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::huggingface::ModelKind;

    #[test]
    fn test_model_options() {
        let options = model_options();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].label, "Llama 3.3 70B (Advanced)");
        assert_eq!(options[0].model.kind, ModelKind::ChatCompletion);
        assert_eq!(options[1].model.id, "gpt2");
        assert_eq!(options[1].model.kind, ModelKind::RawInference);
    }

    #[test]
    fn test_default_model_is_first() {
        assert_eq!(default_model(), model_options()[0].model);
    }

    #[test]
    fn test_find_model() {
        assert_eq!(find_model("GPT-2 (Basic)"), Some(Model::new("gpt2")));
        assert_eq!(find_model("gpt2"), Some(Model::new("gpt2")));
        assert_eq!(find_model("gpt3"), None);
    }

    #[test]
    fn test_resolve_model_accepts_custom_ids() {
        let model = resolve_model("TinyLlama/TinyLlama-1.1B-Chat-v1.0");
        assert_eq!(model.id, "TinyLlama/TinyLlama-1.1B-Chat-v1.0");
        assert_eq!(model.kind, ModelKind::ChatCompletion);
        assert_eq!(label_for(&model), None);
        assert_eq!(label_for(&default_model()), Some("Llama 3.3 70B (Advanced)"));
    }

    #[test]
    fn test_model_option_serialization() {
        let json = serde_json::to_value(&model_options()[1]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"label": "GPT-2 (Basic)", "id": "gpt2", "kind": "raw_inference"})
        );
    }
}

use crate::constants::NONE_MESH;
use crate::form::LoadTestForm;
use crate::validation::TestDuration;
use url::form_urlencoded;
use uuid::Uuid;

/// Query parameters of a run, in the order they are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    params: Vec<(&'static str, String)>,
}

impl RunRequest {
    /// Flatten the current form into run parameters.
    ///
    /// The duration is split into its numeric value (`t`) and lower-cased unit (`dur`). A mesh
    /// of `None` is sent as an empty string.
    pub fn new(form: &LoadTestForm, test_name: &str, duration: TestDuration, uuid: Uuid) -> Self {
        let mesh = if form.mesh == NONE_MESH {
            String::new()
        } else {
            form.mesh.clone()
        };

        let params = vec![
            ("name", test_name.to_string()),
            ("mesh", mesh),
            ("url", form.url.clone()),
            ("c", form.concurrency.clone()),
            ("qps", form.qps.clone()),
            ("t", duration.value().to_string()),
            ("dur", duration.unit().suffix().to_string()),
            ("uuid", uuid.to_string()),
            ("loadGenerator", form.load_generator.to_string()),
            ("additional_options", form.additional_options.clone()),
            ("headers", form.headers.clone()),
            ("cookies", form.cookies.clone()),
            ("reqBody", form.body.clone()),
            ("contentType", form.content_type.clone()),
        ];

        Self { params }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn to_query(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params())
            .finish()
    }
}

use crate::{Resource, State};

mod requests_test;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TestState {
    pub count: i32,
    pub data: Option<Resource<String>>,
}

impl State for TestState {}

impl TestState {
    pub fn set_count(self, count: i32) -> Self {
        Self { count, ..self }
    }

    pub fn add_count(self, delta: i32) -> Self {
        Self {
            count: self.count + delta,
            ..self
        }
    }

    pub fn set_data(self, data: Resource<String>) -> Self {
        Self {
            data: Some(data),
            ..self
        }
    }

    pub fn data_complete(&self) -> bool {
        self.data.as_ref().is_some_and(Resource::is_complete)
    }
}

use bg_core::{FieldValue, StepField, TestStep, TestSteps};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepPairing {
    pub steps: Option<TestSteps>,
    /// Set when both fields were present but could not be matched item for
    /// item, so a single pair of rendered blocks was produced.
    pub fell_back: bool,
}

/// Pairs `steps` with `expectedresults`. Blank values count as absent.
pub fn pair_steps(steps: Option<&FieldValue>, expected: Option<&FieldValue>) -> StepPairing {
    let steps = steps.filter(|value| !value.is_blank());
    let expected = expected.filter(|value| !value.is_blank());

    let (steps, expected) = match (steps, expected) {
        (None, None) => {
            return StepPairing {
                steps: None,
                fell_back: false,
            }
        }
        (Some(value), None) => return unpaired(StepField::Steps, value),
        (None, Some(value)) => return unpaired(StepField::ExpectedResults, value),
        (Some(steps), Some(expected)) => (steps, expected),
    };

    match (steps, expected) {
        (FieldValue::Text(step), FieldValue::Text(expected)) => paired(vec![TestStep {
            step: step.clone(),
            expected: expected.clone(),
        }]),
        (FieldValue::List(steps), FieldValue::List(expected)) if steps.len() == expected.len() => {
            paired(
                steps
                    .iter()
                    .zip(expected)
                    .map(|(step, expected)| TestStep {
                        step: step.clone(),
                        expected: expected.clone(),
                    })
                    .collect(),
            )
        }
        _ => StepPairing {
            steps: Some(TestSteps::Paired {
                pairs: vec![TestStep {
                    step: steps.render(),
                    expected: expected.render(),
                }],
            }),
            fell_back: true,
        },
    }
}

fn paired(pairs: Vec<TestStep>) -> StepPairing {
    StepPairing {
        steps: Some(TestSteps::Paired { pairs }),
        fell_back: false,
    }
}

fn unpaired(field: StepField, value: &FieldValue) -> StepPairing {
    StepPairing {
        steps: Some(TestSteps::Unpaired {
            field,
            text: value.render(),
        }),
        fell_back: false,
    }
}

//! Worked examples served by the informational endpoint.

use crate::models::Scenario;

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            title: "Bola the Technician".into(),
            description: "A scenario for a self-employed individual.".into(),
            example: "Bola is a phone technician who earns ₦1,200,000 annually. He has no \
                      pension but pays ₦300,000 in rent. Based on the tax laws, his monthly tax \
                      is calculated after considering his reliefs. Since he earns above the \
                      minimum threshold, he is not exempt from tax."
                .into(),
        },
        Scenario {
            title: "Aisha the Doctor".into(),
            description: "A scenario for a salaried employee with full deductions.".into(),
            example: "Aisha is a doctor at a private hospital with an annual salary of \
                      ₦5,000,000. She contributes 8% to her pension, 2.5% to the NHF, and 5% to \
                      the NHIS. Her tax is calculated on her income after these statutory \
                      deductions and her consolidated relief are considered."
                .into(),
        },
    ]
}

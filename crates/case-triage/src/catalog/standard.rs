use super::{CategoryId, IndicatorCategory, IndicatorDefinition};
use crate::scoring::{IndicatorId, Severity};

const CONFESSIONS: CategoryId = CategoryId(1);
const EYEWITNESS: CategoryId = CategoryId(2);
const FORENSICS: CategoryId = CategoryId(3);
const MISCONDUCT: CategoryId = CategoryId(4);
const PROCEDURE: CategoryId = CategoryId(5);

pub(super) fn categories() -> Vec<IndicatorCategory> {
    vec![
        category(
            CONFESSIONS,
            "Confession & Interrogation",
            "Statements obtained under coercive or unreliable interrogation conditions",
            1.4,
        ),
        category(
            EYEWITNESS,
            "Eyewitness Identification",
            "Identification testimony with known reliability problems",
            1.3,
        ),
        category(
            FORENSICS,
            "Forensic Evidence",
            "Physical evidence that is missing, untested, or scientifically unsound",
            1.5,
        ),
        category(
            MISCONDUCT,
            "Official Misconduct",
            "Prosecutorial or police conduct that compromised the trial",
            1.5,
        ),
        category(
            PROCEDURE,
            "Post-Conviction & Procedure",
            "Weaknesses in the prosecution case and developments after conviction",
            1.2,
        ),
    ]
}

pub(super) fn indicators() -> Vec<IndicatorDefinition> {
    use Severity::{Critical, High, Low, Medium};

    vec![
        indicator(
            1,
            CONFESSIONS,
            "Long High-Pressure Interrogation",
            High,
            1.5,
            "Interrogation lasting many hours or conducted without breaks",
        ),
        indicator(
            2,
            CONFESSIONS,
            "Coerced or False Confession",
            Critical,
            2.0,
            "Confession obtained through threats, promises, or deception",
        ),
        indicator(
            3,
            CONFESSIONS,
            "Confession Recanted",
            Medium,
            1.2,
            "Defendant withdrew the confession after interrogation",
        ),
        indicator(
            4,
            CONFESSIONS,
            "Confession Missing Details",
            High,
            1.4,
            "Confession lacks or contradicts facts only the perpetrator would know",
        ),
        indicator(
            5,
            EYEWITNESS,
            "Single Unreliable Eyewitness",
            High,
            1.6,
            "Conviction rests on one witness with limited opportunity to observe",
        ),
        indicator(
            6,
            EYEWITNESS,
            "Cross-Racial Identification",
            Medium,
            1.2,
            "Witness identified a suspect of a different race",
        ),
        indicator(
            7,
            EYEWITNESS,
            "Suggestive Lineup Procedures",
            High,
            1.5,
            "Show-ups, single-photo displays, or lineups that singled out the suspect",
        ),
        indicator(
            8,
            EYEWITNESS,
            "Witness Uncertainty",
            Medium,
            1.1,
            "Witness expressed doubt about the identification",
        ),
        indicator(
            9,
            EYEWITNESS,
            "Witness Recantation",
            Critical,
            1.8,
            "Key witness has withdrawn prior testimony",
        ),
        indicator(
            10,
            EYEWITNESS,
            "Inconsistent Witness Statements",
            Medium,
            1.2,
            "Witness accounts changed materially between statements and trial",
        ),
        indicator(
            11,
            FORENSICS,
            "No Physical Evidence",
            High,
            1.4,
            "No physical evidence connects the defendant to the crime",
        ),
        indicator(
            12,
            FORENSICS,
            "Forensic Evidence Disproven",
            Critical,
            2.0,
            "Later analysis contradicts forensic evidence presented at trial",
        ),
        indicator(
            13,
            FORENSICS,
            "Discredited Forensic Methods",
            High,
            1.6,
            "Conviction relied on bite-mark, hair, or similar discredited analysis",
        ),
        indicator(
            14,
            FORENSICS,
            "DNA Not Tested",
            Critical,
            1.9,
            "Biological evidence exists but was never subjected to DNA testing",
        ),
        indicator(
            15,
            MISCONDUCT,
            "Brady Violations",
            Critical,
            2.0,
            "Exculpatory evidence was withheld from the defense",
        ),
        indicator(
            16,
            MISCONDUCT,
            "Fabricated Witness Statements",
            Critical,
            1.9,
            "Statements attributed to witnesses were invented or altered",
        ),
        indicator(
            17,
            MISCONDUCT,
            "Official Misconduct",
            High,
            1.6,
            "Police or prosecutors acted improperly during investigation or trial",
        ),
        indicator(
            18,
            MISCONDUCT,
            "Inflammatory Arguments",
            Medium,
            1.0,
            "Prosecution relied on prejudicial or inflammatory argument",
        ),
        indicator(
            19,
            PROCEDURE,
            "Weak Prosecution Evidence",
            High,
            1.5,
            "Prosecution case was largely circumstantial",
        ),
        indicator(
            20,
            PROCEDURE,
            "Multiple Appeals",
            Low,
            0.8,
            "Defendant has pursued repeated appeals asserting innocence",
        ),
        indicator(
            21,
            PROCEDURE,
            "New Exculpatory Evidence",
            Critical,
            2.0,
            "Evidence pointing to innocence surfaced after conviction",
        ),
        indicator(
            22,
            PROCEDURE,
            "Ineffective Assistance of Counsel",
            High,
            1.4,
            "Defense counsel failed to investigate or present a defense",
        ),
        indicator(
            23,
            PROCEDURE,
            "Jailhouse Informant Testimony",
            High,
            1.5,
            "Testimony from an informant who received benefits in exchange",
        ),
        indicator(
            24,
            PROCEDURE,
            "Incentivized Witness",
            Medium,
            1.2,
            "Witness testified under a plea deal or other incentive",
        ),
    ]
}

fn category(id: CategoryId, name: &str, description: &str, weight: f64) -> IndicatorCategory {
    IndicatorCategory {
        id,
        name: name.to_string(),
        description: description.to_string(),
        weight,
    }
}

fn indicator(
    id: u32,
    category_id: CategoryId,
    name: &str,
    severity: Severity,
    weight: f64,
    description: &str,
) -> IndicatorDefinition {
    IndicatorDefinition {
        id: IndicatorId(id),
        category_id,
        name: name.to_string(),
        description: description.to_string(),
        severity,
        weight,
    }
}

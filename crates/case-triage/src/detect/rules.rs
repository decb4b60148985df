use serde::Serialize;

/// Area of the record a rule inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorFamily {
    Confession,
    Eyewitness,
    Forensic,
    Misconduct,
}

impl DetectorFamily {
    pub const fn label(self) -> &'static str {
        match self {
            DetectorFamily::Confession => "confession",
            DetectorFamily::Eyewitness => "eyewitness",
            DetectorFamily::Forensic => "forensic",
            DetectorFamily::Misconduct => "misconduct",
        }
    }
}

/// Patterns whose first hit flags `indicator` at `confidence`.
#[derive(Debug, Clone, Copy)]
pub(super) struct Rule {
    pub(super) family: DetectorFamily,
    pub(super) indicator: &'static str,
    pub(super) confidence: f64,
    pub(super) patterns: &'static [&'static str],
}

pub(super) const INTERROGATION_HOURS: &str = r"(\d+)\s*hour";
pub(super) const LONG_INTERROGATION: &str = "Long High-Pressure Interrogation";
pub(super) const EXTENDED_INTERROGATION_HOURS: u32 = 8;
pub(super) const EXTENDED_INTERROGATION_CONFIDENCE: f64 = 0.90;

pub(super) static RULES: &[Rule] = &[
    Rule {
        family: DetectorFamily::Confession,
        indicator: "Coerced or False Confession",
        confidence: 0.75,
        patterns: &[
            r"(coer(ced|cion)|force[d]?|pressure|threat|intimidat)",
            r"(fear|afraid|scared).*confess",
            r"didn't.*want.*confess",
            r"(told|said).*confess.*or else",
        ],
    },
    Rule {
        family: DetectorFamily::Confession,
        indicator: "Confession Recanted",
        confidence: 0.85,
        patterns: &[
            r"recant(ed|ation)",
            r"take.*back.*confession",
            r"(false|untrue).*confession",
            r"not.*true.*when.*confess",
        ],
    },
    Rule {
        family: DetectorFamily::Confession,
        indicator: "Confession Missing Details",
        confidence: 0.70,
        patterns: &[
            r"lack.*detail",
            r"vague.*confession",
            r"general.*statement",
            r"no.*specific.*information",
            r"couldn't.*describe",
        ],
    },
    Rule {
        family: DetectorFamily::Confession,
        indicator: LONG_INTERROGATION,
        confidence: 0.80,
        patterns: &[
            INTERROGATION_HOURS,
            r"(lengthy|extended|prolonged).*interrogation",
            r"all\s*(night|day)",
            r"without.*break",
            r"exhausted|tired|fatigue",
        ],
    },
    Rule {
        family: DetectorFamily::Eyewitness,
        indicator: "Single Unreliable Eyewitness",
        confidence: 0.70,
        patterns: &[
            r"(single|only|sole).*witness",
            r"(unreliable|questionable|doubtful).*witness",
            r"(poor|limited|obstructed).*view",
            r"(dark|night|dim).*lighting",
            r"(brief|quick|fleeting).*glance",
        ],
    },
    Rule {
        family: DetectorFamily::Eyewitness,
        indicator: "Cross-Racial Identification",
        confidence: 0.75,
        patterns: &[
            r"cross-racial.*identification",
            r"different.*race",
            r"(white|black|hispanic|asian).*witness.*(white|black|hispanic|asian).*defendant",
        ],
    },
    Rule {
        family: DetectorFamily::Eyewitness,
        indicator: "Suggestive Lineup Procedures",
        confidence: 0.80,
        patterns: &[
            r"(suggestive|biased|flawed).*lineup",
            r"(single|show-?up).*identification",
            r"(photo.*array|lineup).*problematic",
            r"only.*one.*match",
            r"stood.*out",
        ],
    },
    Rule {
        family: DetectorFamily::Eyewitness,
        indicator: "Witness Uncertainty",
        confidence: 0.65,
        patterns: &[
            r"(not|un)sure",
            r"(might|maybe|possibly|perhaps)",
            r"(hesitat|uncertain)",
            r"looks.*like",
            r"could.*be",
            r"coached.*witness",
        ],
    },
    Rule {
        family: DetectorFamily::Eyewitness,
        indicator: "Witness Recantation",
        confidence: 0.90,
        patterns: &[
            r"witness.*recant",
            r"take.*back.*testimony",
            r"was.*wrong.*identification",
            r"mistaken.*identity",
        ],
    },
    Rule {
        family: DetectorFamily::Eyewitness,
        indicator: "Inconsistent Witness Statements",
        confidence: 0.70,
        patterns: &[
            r"(inconsistent|contradict|conflict).*statement",
            r"(changed|modified|altered).*testimony",
            r"(different|varying).*account",
        ],
    },
    Rule {
        family: DetectorFamily::Forensic,
        indicator: "No Physical Evidence",
        confidence: 0.75,
        patterns: &[
            r"no.*(physical|forensic).*evidence",
            r"lack.*evidence",
            r"absence.*evidence",
            r"without.*evidence",
        ],
    },
    Rule {
        family: DetectorFamily::Forensic,
        indicator: "Forensic Evidence Disproven",
        confidence: 0.85,
        patterns: &[
            r"(disproven|discredited|invalidated).*evidence",
            r"(false|erroneous).*forensic",
            r"(retracted|withdrawn).*expert",
        ],
    },
    Rule {
        family: DetectorFamily::Forensic,
        indicator: "Discredited Forensic Methods",
        confidence: 0.80,
        patterns: &[
            r"(hair|bite.*mark|fiber).*analysis",
            r"discredited.*method",
            r"(unreliable|unvalidated).*technique",
            r"junk.*science",
            r"arson.*investigation.*flawed",
        ],
    },
    Rule {
        family: DetectorFamily::Forensic,
        indicator: "DNA Not Tested",
        confidence: 0.85,
        patterns: &[
            r"dna.*(not|never).*test",
            r"dna.*excluded",
            r"dna.*evidence.*unavailable",
            r"dna.*not.*admitted",
            r"refuse.*dna.*test",
        ],
    },
    Rule {
        family: DetectorFamily::Misconduct,
        indicator: "Brady Violations",
        confidence: 0.90,
        patterns: &[
            r"brady.*violation",
            r"withheld.*evidence",
            r"suppressed.*evidence",
            r"(concealed|hid).*exculpatory",
            r"failed.*disclose",
        ],
    },
    Rule {
        family: DetectorFamily::Misconduct,
        indicator: "Fabricated Witness Statements",
        confidence: 0.85,
        patterns: &[
            r"(fabricat|manufactur|creat).*evidence",
            r"(false|fake).*statement",
            r"(plant|tamper).*evidence",
            r"coerced.*testimony",
        ],
    },
    Rule {
        family: DetectorFamily::Misconduct,
        indicator: "Official Misconduct",
        confidence: 0.80,
        patterns: &[
            r"(prosecutorial|police).*misconduct",
            r"(abuse|misuse).*power",
            r"(corrupt|improper).*conduct",
            r"(bias|prejudice).*investigation",
        ],
    },
    Rule {
        family: DetectorFamily::Misconduct,
        indicator: "Inflammatory Arguments",
        confidence: 0.70,
        patterns: &[
            r"inflammatory.*argument",
            r"prejudicial.*statement",
            r"improper.*closing",
            r"appeal.*emotion",
        ],
    },
];

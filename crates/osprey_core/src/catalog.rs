use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Registry accounts for the first-party algorithms (pca, kmeans, linear-learner, ...).
const FIRST_PARTY_REGISTRIES: &[(&str, &str)] = &[
    ("us-east-1", "382416733822"),
    ("us-east-2", "404615174143"),
    ("us-west-1", "632365934929"),
    ("us-west-2", "174872318107"),
    ("eu-west-1", "438346466558"),
    ("eu-west-2", "644912444149"),
    ("eu-central-1", "664544806723"),
    ("ap-northeast-1", "351501993468"),
    ("ap-northeast-2", "835164637446"),
    ("ap-southeast-1", "475088953585"),
    ("ap-southeast-2", "712309505854"),
    ("ap-south-1", "991648021394"),
    ("ca-central-1", "469771592824"),
    ("us-gov-west-1", "226302683700"),
];

/// Registry accounts for xgboost, deepar, seq2seq and the vision algorithms.
const FRAMEWORK_REGISTRIES: &[(&str, &str)] = &[
    ("us-east-1", "811284229777"),
    ("us-east-2", "825641698319"),
    ("us-west-1", "632365934929"),
    ("us-west-2", "433757028032"),
    ("eu-west-1", "685385470294"),
    ("eu-west-2", "644912444149"),
    ("eu-central-1", "813361260812"),
    ("ap-northeast-1", "501404015308"),
    ("ap-northeast-2", "306986355934"),
    ("ap-southeast-1", "475088953585"),
    ("ap-southeast-2", "544295431143"),
    ("ap-south-1", "991648021394"),
    ("ca-central-1", "469771592824"),
    ("us-gov-west-1", "226302683700"),
];

const LDA_REGISTRIES: &[(&str, &str)] = &[
    ("us-east-1", "766337827248"),
    ("us-east-2", "999911452149"),
    ("us-west-2", "266724342769"),
    ("eu-west-1", "999678624901"),
];

/// (display name, canonical identifier, registry table)
const BUILT_IN_ALGORITHMS: &[(&str, &str, &[(&str, &str)])] = &[
    ("BlazingText", "blazingtext", FRAMEWORK_REGISTRIES),
    ("DeepAR Forecasting", "forecasting-deepar", FRAMEWORK_REGISTRIES),
    ("Factorization Machines", "factorization-machines", FIRST_PARTY_REGISTRIES),
    ("Image Classification", "image-classification", FRAMEWORK_REGISTRIES),
    ("IP Insights", "ipinsights", FIRST_PARTY_REGISTRIES),
    ("K-Means", "kmeans", FIRST_PARTY_REGISTRIES),
    ("K-Nearest Neighbors", "knn", FIRST_PARTY_REGISTRIES),
    ("K-NN", "knn", FIRST_PARTY_REGISTRIES),
    ("LDA", "lda", LDA_REGISTRIES),
    ("Linear Learner", "linear-learner", FIRST_PARTY_REGISTRIES),
    ("Neural Topic Model", "ntm", FIRST_PARTY_REGISTRIES),
    ("Object2Vec", "object2vec", FIRST_PARTY_REGISTRIES),
    ("Object Detection", "object-detection", FRAMEWORK_REGISTRIES),
    ("PCA", "pca", FIRST_PARTY_REGISTRIES),
    ("Random Cut Forest", "randomcutforest", FIRST_PARTY_REGISTRIES),
    ("Semantic Segmentation", "semantic-segmentation", FRAMEWORK_REGISTRIES),
    ("Sequence to Sequence", "seq2seq", FRAMEWORK_REGISTRIES),
    ("Seq2Seq Modeling", "seq2seq", FRAMEWORK_REGISTRIES),
    ("XGBoost", "xgboost", FRAMEWORK_REGISTRIES),
];

/// Region key matching every region in [`AlgorithmEntry::images`].
pub const ANY_REGION: &str = "*";

/// A built-in algorithm and the image it runs in each region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmEntry {
    /// Human-readable name, e.g. "Linear Learner".
    pub name: String,
    /// The service's identifier, e.g. "linear-learner".
    pub canonical: String,
    /// Region -> image. [`ANY_REGION`] is used when the region has no entry.
    pub images: BTreeMap<String, String>,
}

impl AlgorithmEntry {
    fn matches(&self, normalized: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(normalized)
            || self.canonical.trim().eq_ignore_ascii_case(normalized)
    }

    fn image_for(&self, region: Option<&str>) -> Option<&str> {
        region
            .and_then(|r| self.images.get(r))
            .or_else(|| self.images.get(ANY_REGION))
            .map(String::as_str)
    }
}

/// Result of looking an algorithm up in the [`AlgorithmCatalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// A built-in algorithm with an image for the requested region.
    Image(&'a str),
    /// A built-in algorithm that is not published in the requested region.
    UnsupportedRegion,
    /// Not a built-in algorithm; the name refers to the caller's own algorithm resource.
    Unknown,
}

/// Read-only mapping from built-in algorithm names to their container images.
///
/// Built once at startup and passed to whoever needs it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlgorithmCatalog {
    entries: Vec<AlgorithmEntry>,
}

impl AlgorithmCatalog {
    pub fn new(entries: impl IntoIterator<Item = AlgorithmEntry>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// The SageMaker built-in algorithms, resolving to
    /// `<account>.dkr.ecr.<region>.amazonaws.com/<canonical>:1`.
    pub fn builtin() -> Self {
        let entries = BUILT_IN_ALGORITHMS
            .iter()
            .map(|(name, canonical, registries)| AlgorithmEntry {
                name: name.to_string(),
                canonical: canonical.to_string(),
                images: registries
                    .iter()
                    .map(|(region, account)| {
                        (
                            region.to_string(),
                            format!("{account}.dkr.ecr.{region}.amazonaws.com/{canonical}:1"),
                        )
                    })
                    .collect(),
            })
            .collect::<Vec<_>>();

        Self { entries }
    }

    /// Parses a catalog from a JSON array of [`AlgorithmEntry`].
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn entries(&self) -> &[AlgorithmEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds an algorithm by display name or canonical identifier.
    ///
    /// The lookup trims whitespace and ignores case on both sides.
    pub fn find(&self, algorithm: &str) -> Option<&AlgorithmEntry> {
        let normalized = algorithm.trim().to_lowercase();
        self.entries.iter().find(|e| e.matches(&normalized))
    }

    pub fn lookup(&self, algorithm: &str, region: Option<&str>) -> Lookup<'_> {
        match self.find(algorithm) {
            Some(entry) => entry
                .image_for(region)
                .map(Lookup::Image)
                .unwrap_or(Lookup::UnsupportedRegion),
            None => Lookup::Unknown,
        }
    }
}

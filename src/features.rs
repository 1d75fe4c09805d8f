use std::collections::HashSet;

/// Character n-grams found in one URL that the model knows about.
pub type FeatureSet = HashSet<String>;

/// Extracts every vocabulary n-gram of length `min_n..=max_n` from `url`.
///
/// The URL is padded with one space on each side before windowing, matching
/// the `char_wb` analyzer the model was trained with. No case folding or other
/// normalisation is applied: the weights are keyed on the exact substrings.
pub fn extract_features(url: &str, vocabulary: &HashSet<String>, ngram_range: (usize, usize)) -> FeatureSet {
    let (min_n, max_n) = ngram_range;
    let padded = format!(" {} ", url);

    // Byte offset of every char boundary, including the end of the string.
    let boundaries: Vec<usize> = padded
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(padded.len()))
        .collect();
    let char_count = boundaries.len() - 1;

    let mut features = FeatureSet::new();
    for n in min_n.max(1)..=max_n {
        if n > char_count {
            break;
        }
        for start in 0..=(char_count - n) {
            let ngram = &padded[boundaries[start]..boundaries[start + n]];
            if vocabulary.contains(ngram) && !features.contains(ngram) {
                features.insert(ngram.to_string());
            }
        }
    }

    features
}

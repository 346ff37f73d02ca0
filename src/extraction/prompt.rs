//! Prompt construction for the incremental extraction loop.
//!
//! Both builders are purely textual: the schema is an opaque JSON string to
//! embed, never validated here.

/// Build the prompt for one chunk.
///
/// When `previous` is present the model is told to keep every field it has
/// already produced and only add what is still missing. That instruction is
/// what makes wholesale candidate replacement in the engine safe.
pub fn build_extraction_prompt(chunk: &str, schema_json: &str, previous: Option<&str>) -> String {
    let previous_block = match previous {
        Some(prior) => format!(
            "You have previously given me the following information:\n\
             <previous_information>\n{prior}\n</previous_information>\n\
             You only need to extract information that is still missing from the \
             previous information. Do not change any of the information you have \
             already given; only add new information that is missing.\n\n"
        ),
        None => String::new(),
    };

    format!(
        "You will be given some content to extract information from, as well as a \
         JSON object specifying what information needs to be extracted from that \
         content. Your task is to extract the requested information and return it \
         in JSON format.\n\n\
         Here is the content to extract information from:\n\
         <content>\n{chunk}\n</content>\n\n\
         Here is the JSON object specifying what information to extract:\n\
         <json_object>\n{schema_json}\n</json_object>\n\n\
         {previous_block}\
         Carefully study the provided JSON object to understand exactly which pieces \
         of information need to be extracted. The keys name the desired fields and \
         the values describe what each field means. Then go through the content and \
         pull out all of the requested information, accurately and completely.\n\n\
         Return the extracted data as a single JSON object inside one code block \
         with ```json tags, like this:\n\n\
         ```json\n\
         {{\n  \"key1\": \"value1\",\n  \"key2\": \"value2\"\n}}\n\
         ```\n\n\
         Do not include any text before or after the code block, and make sure the \
         JSON is properly formatted with quoted keys and values. Return ONLY the \
         JSON code block, without any additional explanation or commentary."
    )
}

/// Build the yes/no completeness check for an accumulated result.
pub fn build_completeness_prompt(candidate: &str, schema_json: &str) -> String {
    format!(
        "Given this response:\n{candidate}\n\n\
         does it contain all the information requested in this JSON object?\n\
         {schema_json}\n\n\
         Respond with exactly \"yes\" or \"no\", nothing else."
    )
}

/// Only a literal affirmative advances the loop to done. Anything else
/// (hedging, punctuation, empty output) means "keep going".
pub fn is_affirmative(response: &str) -> bool {
    response.trim().eq_ignore_ascii_case("yes")
}

//! Action invocation results, split by `resultType`.

use crate::error::DispatchResult;
use crate::handler::{parse_body, HandlerDescriptor};
use crate::protocol::{ReprType, Representation, ResponseEnvelope};

pub const RESULT_LIST: HandlerDescriptor =
    HandlerDescriptor::new("result-list", is_result_list, parse_result_list);
pub const RESULT_OBJECT: HandlerDescriptor =
    HandlerDescriptor::new("result-object", is_result_object, parse_result_object);
pub const RESULT_VALUE: HandlerDescriptor =
    HandlerDescriptor::new("result-value", is_result_value, parse_result_value);

fn is_action_result(envelope: &ResponseEnvelope) -> bool {
    envelope.has_repr_type(ReprType::ActionResult) || envelope.path_ends_with_segment("invoke")
}

fn is_result_list(envelope: &ResponseEnvelope) -> bool {
    is_action_result(envelope) && envelope.top_level_str_eq("resultType", "list")
}

fn is_result_object(envelope: &ResponseEnvelope) -> bool {
    is_action_result(envelope) && envelope.top_level_str_eq("resultType", "object")
}

fn is_result_value(envelope: &ResponseEnvelope) -> bool {
    is_action_result(envelope)
        && (envelope.top_level_str_eq("resultType", "scalar")
            || envelope.top_level_str_eq("resultType", "void"))
}

fn parse_result_list(envelope: &ResponseEnvelope) -> DispatchResult<Representation> {
    parse_body("result-list", envelope).map(Representation::ResultList)
}

fn parse_result_object(envelope: &ResponseEnvelope) -> DispatchResult<Representation> {
    parse_body("result-object", envelope).map(Representation::ResultObject)
}

fn parse_result_value(envelope: &ResponseEnvelope) -> DispatchResult<Representation> {
    parse_body("result-value", envelope).map(Representation::ResultValue)
}

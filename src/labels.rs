/// Human-readable label for a parameter name. Unknown names are shown as is.
pub fn display_name(name: &str) -> &str {
    match name {
        "environment_sub_domain" => "Environment Sub Domain",
        "environment_user_name" => "User Name",
        "environment_password" => "Password",
        "environment_f2a_token" => "F2A Token",
        "ws_name" => "Workspace Name",
        "start_timestamp" => "Start Date",
        "end_timestamp" => "End Date",
        "period" => "Period",
        "stage" => "Stage Environment",
        "compliance_standard" => "Compliance Standard",
        "accounts" => "Accounts",
        "label" => "Label",
        "resource_type" => "Resource Type",
        "tags" => "Tags",
        "action" => "Action",
        "dst_resource_id" => "Destination Resource ID",
        "start_time" => "Start Time",
        "end_time" => "End Time",
        "src_public" => "Internet Sources Only",
        "protocols" => "Protocols",
        other => other,
    }
}
